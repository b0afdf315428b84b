//! Bounded window of the most recent replies shown on the chart

use std::collections::VecDeque;

/// Two parallel FIFO sequences (sequence number, latency) capped at `capacity`.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    sequences: VecDeque<u64>,
    latencies: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create an empty window; a zero capacity is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            sequences: VecDeque::with_capacity(capacity),
            latencies: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reply, evicting the oldest one when full
    pub fn push(&mut self, sequence: u64, latency_ms: f64) {
        if self.sequences.len() == self.capacity {
            self.sequences.pop_front();
            self.latencies.pop_front();
        }
        self.sequences.push_back(sequence);
        self.latencies.push_back(latency_ms);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequences(&self) -> Vec<u64> {
        self.sequences.iter().copied().collect()
    }

    pub fn latencies(&self) -> Vec<f64> {
        self.latencies.iter().copied().collect()
    }

    /// Chart points as `(sequence, latency)` pairs
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.sequences
            .iter()
            .zip(self.latencies.iter())
            .map(|(&seq, &latency)| (seq as f64, latency))
            .collect()
    }
}
