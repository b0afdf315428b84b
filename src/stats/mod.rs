//! Packet counters and latency statistics for a ping run

pub mod window;

pub use window::SlidingWindow;

use serde::{Deserialize, Serialize};

/// Sent/received/lost packet counters.
///
/// `sent == received + lost` holds whenever no probe is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketCounters {
    pub sent: u64,
    pub received: u64,
    pub lost: u64,
}

impl PacketCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a probe as sent; returns its sequence number (1-based)
    pub fn record_sent(&mut self) -> u64 {
        self.sent += 1;
        self.sent
    }

    pub fn record_received(&mut self) {
        self.received += 1;
    }

    pub fn record_lost(&mut self) {
        self.lost += 1;
    }

    /// Probes whose outcome has not been recorded yet
    pub fn in_flight(&self) -> u64 {
        self.sent - self.received - self.lost
    }

    /// Loss percentage; 0 when nothing has been sent
    pub fn loss_percent(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            (self.lost as f64 / self.sent as f64) * 100.0
        }
    }
}

/// Summary of a latency sample set, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
}

/// Every successful latency of the run, in arrival order. Never evicted.
#[derive(Debug, Clone, Default)]
pub struct LatencyHistory {
    samples: Vec<f64>,
}

impl LatencyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, latency_ms: f64) {
        self.samples.push(latency_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
        }
    }

    /// Sample standard deviation (n - 1 denominator); 0 for fewer than two samples
    pub fn std_dev(&self) -> f64 {
        let count = self.samples.len();
        if count < 2 {
            return 0.0;
        }

        let mean = self.samples.iter().sum::<f64>() / count as f64;
        let variance = self
            .samples
            .iter()
            .map(|value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;

        variance.sqrt()
    }

    /// Min/avg/max/stddev; `None` until the first successful probe
    pub fn summary(&self) -> Option<LatencySummary> {
        Some(LatencySummary {
            count: self.samples.len(),
            min_ms: self.min()?,
            avg_ms: self.mean()?,
            max_ms: self.max()?,
            std_dev_ms: self.std_dev(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_loss_percent() {
        let mut counters = PacketCounters::new();
        assert_eq!(counters.loss_percent(), 0.0);

        counters.record_sent();
        counters.record_received();
        counters.record_sent();
        counters.record_lost();
        counters.record_sent();
        counters.record_received();

        assert_eq!(counters.sent, 3);
        assert!((counters.loss_percent() - 33.333_333).abs() < 1e-4);
        assert_eq!(counters.in_flight(), 0);
    }

    #[test]
    fn test_record_sent_returns_sequence() {
        let mut counters = PacketCounters::new();
        assert_eq!(counters.record_sent(), 1);
        assert_eq!(counters.in_flight(), 1);
        counters.record_lost();
        assert_eq!(counters.record_sent(), 2);
    }

    #[test]
    fn test_empty_history_has_no_summary() {
        let history = LatencyHistory::new();
        assert!(history.summary().is_none());
        assert_eq!(history.std_dev(), 0.0);
    }

    #[test]
    fn test_single_sample_std_dev_is_zero() {
        let mut history = LatencyHistory::new();
        history.push(42.0);
        let summary = history.summary().unwrap();
        assert_eq!(summary.min_ms, 42.0);
        assert_eq!(summary.max_ms, 42.0);
        assert_eq!(summary.avg_ms, 42.0);
        assert_eq!(summary.std_dev_ms, 0.0);
    }

    #[test]
    fn test_summary_values() {
        let mut history = LatencyHistory::new();
        for value in [10.0, 20.0, 30.0, 40.0] {
            history.push(value);
        }
        let summary = history.summary().unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min_ms, 10.0);
        assert_eq!(summary.max_ms, 40.0);
        assert_eq!(summary.avg_ms, 25.0);
        // sample variance = 500 / 3
        assert!((summary.std_dev_ms - 12.909_944).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_summary_bounds(values in prop::collection::vec(0.0f64..10_000.0, 1..200)) {
            let mut history = LatencyHistory::new();
            for value in &values {
                history.push(*value);
            }
            let summary = history.summary().unwrap();
            prop_assert!(summary.min_ms <= summary.avg_ms + 1e-9);
            prop_assert!(summary.avg_ms <= summary.max_ms + 1e-9);
            prop_assert!(summary.std_dev_ms >= 0.0);
            prop_assert_eq!(summary.count, values.len());
        }

        #[test]
        fn prop_loss_percent_in_range(outcomes in prop::collection::vec(any::<bool>(), 0..300)) {
            let mut counters = PacketCounters::new();
            for ok in &outcomes {
                counters.record_sent();
                if *ok { counters.record_received() } else { counters.record_lost() }
                prop_assert_eq!(counters.sent, counters.received + counters.lost);
            }
            let loss = counters.loss_percent();
            prop_assert!((0.0..=100.0).contains(&loss));
            if counters.sent > 0 {
                let expected = 100.0 * counters.lost as f64 / counters.sent as f64;
                prop_assert!((loss - expected).abs() < 1e-9);
            }
        }
    }
}
