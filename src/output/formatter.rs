//! Text for everything printed around the chart
//!
//! All methods return strings; the sampler decides when to write them and how
//! many lines they add to the redraw cursor.

use super::theme::Theme;
use crate::probe::EchoReply;
use crate::stats::{LatencyHistory, LatencySummary, PacketCounters};
use std::fmt::Write as _;
use std::net::IpAddr;

/// Separator between fields of the live stats line
const SEPARATOR: &str = " │ ";

/// Lines added below the frame by every status notice
pub const NOTICE_LINES: usize = 2;

/// Formats header, status notices and statistics with a [`Theme`]
#[derive(Debug, Clone)]
pub struct StatusFormatter {
    theme: Theme,
}

impl StatusFormatter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Banner printed once before sampling starts
    pub fn header(&self, host: &str, address: Option<IpAddr>) -> String {
        let target = match address {
            Some(address) if address.to_string() != host => {
                format!("🌐 PING {} ({})", host, address)
            }
            _ => format!("🌐 PING {}", host),
        };
        format!(
            "\n{} {}\n\n",
            self.theme.strong(&target, self.theme.header),
            self.theme.paint("(Press Ctrl+C to stop)", self.theme.muted)
        )
    }

    /// Frame shown until the first reply arrives
    pub fn waiting(&self, host: &str) -> String {
        format!(
            "{}\n",
            self.theme
                .paint(&format!("Pinging {}... waiting for data...", host), self.theme.warning)
        )
    }

    /// Live stats line under the chart; starts with a line break and has no
    /// trailing one.
    pub fn live_stats(
        &self,
        current_ms: Option<f64>,
        summary: &LatencySummary,
        loss_percent: f64,
        timeout_occurred: bool,
    ) -> String {
        let theme = &self.theme;
        let current = match current_ms {
            Some(latency) => format!("{:.1}ms", latency),
            None => "--".to_string(),
        };

        let mut line = format!(
            "\n  {} {}",
            theme.bold("Current:"),
            theme.paint(&current, theme.info)
        );
        let fields = [
            ("Min", format!("{:.1}", summary.min_ms), theme.success),
            ("Max", format!("{:.1}", summary.max_ms), theme.warning),
            ("Avg", format!("{:.1}", summary.avg_ms), theme.info),
            ("Loss", format!("{:.1}%", loss_percent), theme.loss_color(loss_percent)),
        ];
        for (label, value, color) in fields {
            let _ = write!(line, "{}{}: {}", SEPARATOR, label, theme.paint(&value, color));
        }

        if timeout_occurred {
            let _ = write!(line, "{}{}", SEPARATOR, theme.strong("✗ TIMEOUT", theme.error));
        }

        line
    }

    /// Notice for a reply; spans [`NOTICE_LINES`] lines
    pub fn reply(&self, host: &str, sequence: u64, reply: &EchoReply) -> String {
        format!(
            "\n  {} {} bytes from {}: icmp_seq={} time={} ms\n",
            self.theme.paint("✓", self.theme.success),
            reply.bytes,
            host,
            sequence,
            self.theme.paint(&format!("{:.2}", reply.latency_ms), self.theme.info)
        )
    }

    /// Notice for a timeout; spans [`NOTICE_LINES`] lines
    pub fn timeout(&self, sequence: u64) -> String {
        format!(
            "\n  {}\n",
            self.theme
                .paint(&format!("✗ Request timeout for icmp_seq {}", sequence), self.theme.error)
        )
    }

    /// Notice for a transport error; spans [`NOTICE_LINES`] lines
    pub fn transport_error(&self, message: &str) -> String {
        format!("\n{}\n", self.theme.paint(&format!("Error: {}", message), self.theme.error))
    }

    /// Printed after the display is erased on cancellation
    pub fn interrupted(&self) -> String {
        format!("\n\n{}\n", self.theme.paint("Interrupted by user", self.theme.warning))
    }
}

/// Final statistics block; empty when no probe succeeded
pub fn format_stats(host: &str, counters: &PacketCounters, history: &LatencyHistory) -> String {
    let Some(summary) = history.summary() else {
        return String::new();
    };

    format!(
        "\n--- {} ping statistics ---\n\
         {} packets transmitted, {} received, {:.1}% packet loss\n\
         rtt min/avg/max/stddev = {:.3}/{:.3}/{:.3}/{:.3} ms",
        host,
        counters.sent,
        counters.received,
        counters.loss_percent(),
        summary.min_ms,
        summary.avg_ms,
        summary.max_ms,
        summary.std_dev_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::frame::Frame;

    fn plain() -> StatusFormatter {
        StatusFormatter::new(Theme::plain())
    }

    fn summary() -> LatencySummary {
        LatencySummary {
            count: 2,
            min_ms: 15.0,
            avg_ms: 20.0,
            max_ms: 25.0,
            std_dev_ms: 7.071,
        }
    }

    #[test]
    fn test_header() {
        let formatter = plain();
        let header = formatter.header("example.com", Some(IpAddr::from([93, 184, 216, 34])));
        assert_eq!(header, "\n🌐 PING example.com (93.184.216.34) (Press Ctrl+C to stop)\n\n");

        let literal = formatter.header("127.0.0.1", Some(IpAddr::from([127, 0, 0, 1])));
        assert_eq!(literal, "\n🌐 PING 127.0.0.1 (Press Ctrl+C to stop)\n\n");
    }

    #[test]
    fn test_waiting_frame_is_one_line() {
        let waiting = plain().waiting("example.com");
        assert_eq!(waiting, "Pinging example.com... waiting for data...\n");
        assert_eq!(Frame::new(waiting).line_count(), 1);
    }

    #[test]
    fn test_live_stats_line() {
        let line = plain().live_stats(Some(25.0), &summary(), 33.333, false);
        assert_eq!(
            line,
            "\n  Current: 25.0ms │ Min: 15.0 │ Max: 25.0 │ Avg: 20.0 │ Loss: 33.3%"
        );
    }

    #[test]
    fn test_live_stats_line_on_timeout() {
        let line = plain().live_stats(None, &summary(), 50.0, true);
        assert!(line.contains("Current: --"));
        assert!(line.ends_with(" │ ✗ TIMEOUT"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_notices_span_fixed_lines() {
        let formatter = plain();
        let reply = formatter.reply("example.com", 3, &EchoReply::with_latency(12.346));
        assert_eq!(reply, "\n  ✓ 64 bytes from example.com: icmp_seq=3 time=12.35 ms\n");

        let timeout = formatter.timeout(4);
        assert_eq!(timeout, "\n  ✗ Request timeout for icmp_seq 4\n");

        let error = formatter.transport_error("network unreachable");
        assert_eq!(error, "\nError: network unreachable\n");

        for notice in [reply, timeout, error] {
            assert_eq!(notice.matches('\n').count(), NOTICE_LINES);
        }
    }

    #[test]
    fn test_interrupted_notice() {
        assert_eq!(plain().interrupted(), "\n\nInterrupted by user\n");
    }

    #[test]
    fn test_format_stats() {
        let mut counters = PacketCounters::new();
        let mut history = LatencyHistory::new();
        for latency in [Some(15.0), None, Some(25.0)] {
            counters.record_sent();
            match latency {
                Some(value) => {
                    counters.record_received();
                    history.push(value);
                }
                None => counters.record_lost(),
            }
        }

        let stats = format_stats("example.com", &counters, &history);
        assert_eq!(
            stats,
            "\n--- example.com ping statistics ---\n\
             3 packets transmitted, 2 received, 33.3% packet loss\n\
             rtt min/avg/max/stddev = 15.000/20.000/25.000/7.071 ms"
        );
    }

    #[test]
    fn test_format_stats_empty_without_replies() {
        let mut counters = PacketCounters::new();
        counters.record_sent();
        counters.record_lost();
        assert_eq!(format_stats("h", &counters, &LatencyHistory::new()), "");
    }
}
