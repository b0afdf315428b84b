//! The sampling loop: probe, record, redraw, sleep
//!
//! Each iteration sends one probe, updates the packet counters, the sliding
//! window and the full latency history, then redraws the chart in place and
//! prints a one-line status notice under it. The loop ends after `count`
//! probes or when the shutdown future resolves; either way the final
//! statistics block is printed.

use crate::error::{AppError, ErrorContext, Result};
use crate::logging::Logger;
use crate::models::Config;
use crate::output::{
    format_stats, ChartData, ChartRenderer, Frame, FrameBuffer, StatusFormatter, TerminalChart,
    Theme, NOTICE_LINES,
};
use crate::probe::{EchoReply, Probe, ProbeOutcome};
use crate::stats::{LatencyHistory, LatencySummary, PacketCounters, SlidingWindow};
use std::future::Future;
use std::io::Write;
use std::net::IpAddr;
use std::pin::Pin;
use std::time::Duration;

/// Run parameters taken from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub host: String,
    /// `None` runs until cancelled
    pub count: Option<u64>,
    pub interval: Duration,
    pub timeout: Duration,
    pub max_points: usize,
}

impl SamplerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            count: config.count,
            interval: config.interval(),
            timeout: config.timeout(),
            max_points: config.max_points,
        }
    }
}

/// What one iteration observed
#[derive(Debug)]
pub enum IterationOutcome {
    Reply(EchoReply),
    Timeout,
    /// The probe itself failed (resolution, permissions, socket)
    Failed(AppError),
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// `count` probes were sent
    Completed,
    /// The shutdown future resolved first
    Cancelled,
}

/// Result of a full run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub end: RunEnd,
    pub counters: PacketCounters,
    pub summary: Option<LatencySummary>,
}

/// Drives a [`Probe`] and draws into `W`
pub struct Sampler<P: Probe, W: Write> {
    settings: SamplerSettings,
    probe: P,
    out: W,
    renderer: Box<dyn ChartRenderer>,
    formatter: StatusFormatter,
    window: SlidingWindow,
    history: LatencyHistory,
    counters: PacketCounters,
    frames: FrameBuffer,
    address: Option<IpAddr>,
    logger: Option<Logger>,
}

impl<P: Probe, W: Write> Sampler<P, W> {
    pub fn new(settings: SamplerSettings, probe: P, out: W, theme: Theme) -> Self {
        let window = SlidingWindow::new(settings.max_points);
        Self {
            settings,
            probe,
            out,
            renderer: Box::new(TerminalChart::new(theme.clone())),
            formatter: StatusFormatter::new(theme),
            window,
            history: LatencyHistory::new(),
            counters: PacketCounters::new(),
            frames: FrameBuffer::new(),
            address: None,
            logger: None,
        }
    }

    /// Replace the chart renderer
    pub fn with_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn counters(&self) -> &PacketCounters {
        &self.counters
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn history(&self) -> &LatencyHistory {
        &self.history
    }

    /// Lines currently on screen below the header
    pub fn lines_drawn(&self) -> usize {
        self.frames.lines_drawn()
    }

    /// Address shown in the header, once resolved
    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Final statistics block; empty when no probe succeeded
    pub fn format_stats(&self) -> String {
        format_stats(&self.settings.host, &self.counters, &self.history)
    }

    /// Print the header, sample until done or cancelled, then print the
    /// final statistics. The statistics are printed even when sampling
    /// stops on an error.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if let Some(logger) = &self.logger {
            logger
                .info("Starting ping")
                .field("host", &self.settings.host)
                .field("count", self.settings.count)
                .field("interval_ms", self.settings.interval.as_millis() as u64)
                .field("max_points", self.settings.max_points)
                .log()
                .await;
        }

        // The header lookup can stall on a slow resolver
        let header = tokio::select! {
            biased;
            _ = shutdown.as_mut() => None,
            header = self.print_header() => Some(header),
        };
        let sampled = match header {
            None => Ok(RunEnd::Cancelled),
            Some(Ok(())) => self.sample(shutdown.as_mut()).await,
            Some(Err(error)) => Err(error),
        };

        let end = match &sampled {
            Ok(end) => *end,
            Err(_) => RunEnd::Completed,
        };
        let finished = self.finish(end).await;

        let end = sampled?;
        finished?;

        Ok(RunReport {
            end,
            counters: self.counters,
            summary: self.history.summary(),
        })
    }

    async fn print_header(&mut self) -> Result<()> {
        let address = match self.probe.resolve(&self.settings.host).await {
            Ok(address) => address,
            Err(error) => {
                if let Some(logger) = &self.logger {
                    logger
                        .debug("Header address lookup failed")
                        .error_info(&error)
                        .field("error", error.to_string())
                        .log()
                        .await;
                }
                None
            }
        };
        self.address = address;

        let header = self.formatter.header(&self.settings.host, self.address);
        self.write(&header)
    }

    fn has_remaining(&self) -> bool {
        self.settings
            .count
            .map_or(true, |count| self.counters.sent < count)
    }

    async fn sample<F>(&mut self, mut shutdown: Pin<&mut F>) -> Result<RunEnd>
    where
        F: Future<Output = ()>,
    {
        while self.has_remaining() {
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => return Ok(RunEnd::Cancelled),
                outcome = self.run_iteration() => {
                    outcome?;
                }
            }

            if !self.has_remaining() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.as_mut() => return Ok(RunEnd::Cancelled),
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        Ok(RunEnd::Completed)
    }

    /// Send one probe, record it, redraw and print its notice
    pub async fn run_iteration(&mut self) -> Result<IterationOutcome> {
        let sequence = self.counters.record_sent();
        let result = self.probe.probe(&self.settings.host, self.settings.timeout).await;

        let (outcome, notice) = match result {
            Ok(ProbeOutcome::Reply(reply)) => {
                self.counters.record_received();
                self.window.push(sequence, reply.latency_ms);
                self.history.push(reply.latency_ms);
                self.redraw(Some(reply.latency_ms), false)?;
                let notice = self.formatter.reply(&self.settings.host, sequence, &reply);
                (IterationOutcome::Reply(reply), notice)
            }
            Ok(ProbeOutcome::Timeout) => {
                self.counters.record_lost();
                self.redraw(None, true)?;
                (IterationOutcome::Timeout, self.formatter.timeout(sequence))
            }
            Err(error) => {
                // No redraw: the previous frame stays and the notice goes under it
                self.counters.record_lost();
                let notice = self.formatter.transport_error(&error.to_string());
                (IterationOutcome::Failed(error), notice)
            }
        };

        self.write(&notice)?;
        self.frames.advance(NOTICE_LINES);
        self.log_outcome(sequence, &outcome).await;

        Ok(outcome)
    }

    /// Replace whatever is on screen with the current chart and stats line
    pub fn redraw(&mut self, current_ms: Option<f64>, timeout_occurred: bool) -> Result<()> {
        let frame = self.compose_frame(current_ms, timeout_occurred)?;
        let output = self.frames.present(&frame);
        self.write(&output)
    }

    fn compose_frame(&self, current_ms: Option<f64>, timeout_occurred: bool) -> Result<Frame> {
        if self.window.is_empty() {
            return Ok(Frame::new(self.formatter.waiting(&self.settings.host)));
        }

        let sequences = self.window.sequences();
        let latencies = self.window.latencies();
        let mut text = self.renderer.render(&ChartData {
            host: &self.settings.host,
            sequences: &sequences,
            latencies: &latencies,
        })?;

        if let Some(summary) = self.history.summary() {
            text.push_str(&self.formatter.live_stats(
                current_ms,
                &summary,
                self.counters.loss_percent(),
                timeout_occurred,
            ));
        }

        Ok(Frame::new(text))
    }

    async fn finish(&mut self, end: RunEnd) -> Result<()> {
        // A probe abandoned on cancellation never got an answer
        if self.counters.in_flight() > 0 {
            self.counters.record_lost();
        }

        let mut output = String::new();
        if end == RunEnd::Cancelled {
            output.push_str(&self.frames.clear());
            output.push_str(&self.formatter.interrupted());
        }
        output.push_str(&self.format_stats());
        output.push('\n');

        if let Some(logger) = &self.logger {
            logger
                .info("Ping finished")
                .field("cancelled", end == RunEnd::Cancelled)
                .field("counters", self.counters)
                .field("summary", self.history.summary())
                .log()
                .await;
        }

        self.write(&output)
    }

    async fn log_outcome(&self, sequence: u64, outcome: &IterationOutcome) {
        let Some(logger) = &self.logger else {
            return;
        };

        match outcome {
            IterationOutcome::Reply(reply) => {
                logger
                    .debug("Echo reply")
                    .field("seq", sequence)
                    .field("latency_ms", reply.latency_ms)
                    .field("bytes", reply.bytes)
                    .log()
                    .await
            }
            IterationOutcome::Timeout => {
                logger
                    .debug("Echo timeout")
                    .field("seq", sequence)
                    .log()
                    .await
            }
            IterationOutcome::Failed(error) => {
                logger
                    .debug("Probe failed")
                    .field("seq", sequence)
                    .field("error", error.to_string())
                    .error_info(error)
                    .log()
                    .await
            }
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .context("Cannot write to terminal")
    }
}
