//! Main application orchestration and execution

use crate::{
    config::display_config_summary,
    defaults::{PREFLIGHT_HOST, PREFLIGHT_TIMEOUT},
    error::Result,
    logging::Logger,
    models::Config,
    output::Theme,
    probe::{Probe, ProbeOutcome},
    sampler::{RunReport, Sampler, SamplerSettings},
};
use std::future::Future;
use std::io::Write;

/// Printed when the loopback check gets no answer
pub const PRIVILEGE_WARNING: &str = "Warning: May need elevated privileges (sudo) to send ICMP packets";

/// Printed after a failed loopback check
pub const PRIVILEGE_NOTE: &str = "Note: This program may require sudo privileges to work properly";

/// Outcome of the start-up loopback check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightStatus {
    /// Loopback answered
    Ready,
    /// Loopback did not answer in time; sampling proceeds anyway
    NoReply,
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    logger: Logger,
}

impl App {
    /// Create a new application instance; opens the log file if one is configured
    pub fn new(config: Config) -> Result<Self> {
        let logger = Logger::with_config("VING".to_string(), &config)?;
        Ok(Self { config, logger })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Probe the loopback address once to catch missing ICMP privileges
    /// before the display starts. Errors are returned unchanged.
    pub async fn preflight<P: Probe>(&self, probe: &P) -> Result<PreflightStatus> {
        let logger = self.logger.child("PREFLIGHT");

        match probe.probe(PREFLIGHT_HOST, PREFLIGHT_TIMEOUT).await {
            Ok(ProbeOutcome::Reply(reply)) => {
                logger
                    .debug("Loopback answered")
                    .field("latency_ms", reply.latency_ms)
                    .log()
                    .await;
                Ok(PreflightStatus::Ready)
            }
            Ok(ProbeOutcome::Timeout) => {
                logger.warn("Loopback did not answer").log().await;
                Ok(PreflightStatus::NoReply)
            }
            Err(error) => {
                logger
                    .error("Loopback probe failed")
                    .error_info(&error)
                    .field("error", error.to_string())
                    .log()
                    .await;
                Err(error)
            }
        }
    }

    /// Sample with the given probe, writing to `out`, until the configured
    /// count is reached or `shutdown` resolves
    pub async fn run_with<P, W, F>(&self, probe: P, out: W, shutdown: F) -> Result<RunReport>
    where
        P: Probe,
        W: Write,
        F: Future<Output = ()>,
    {
        let settings = SamplerSettings::from_config(&self.config);
        let mut sampler = Sampler::new(settings, probe, out, Theme::new(self.config.enable_color))
            .with_logger(self.logger.child("SAMPLER"));

        sampler.run(shutdown).await
    }

    /// Run the application with `probe`, drawing to stdout until the count
    /// is reached or Ctrl+C is pressed
    pub async fn run<P: Probe>(self, probe: P) -> Result<RunReport> {
        let shutdown = interrupt_signal().await;
        let session_id = self.logger.start_session().await;
        self.logger.add_context_field("host", &self.config.host).await;

        if self.config.debug {
            eprintln!(
                "{} v{} ({}, built {})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::GIT_COMMIT,
                crate::BUILD_TIME
            );
            eprintln!("Session: {}", session_id);
            eprintln!("\nConfiguration Summary:");
            eprintln!("{}", display_config_summary(&self.config));
        }

        self.run_with(probe, std::io::stdout(), shutdown).await
    }
}

/// Install the Ctrl+C handler now and return a future that resolves on the
/// first interrupt. If the handler cannot be installed the future never
/// resolves and the run ends only when the count is reached.
pub async fn interrupt_signal() -> impl Future<Output = ()> {
    let mut ctrl_c = Box::pin(tokio::signal::ctrl_c());

    // The handler is registered on first poll
    let early = tokio::select! {
        biased;
        result = &mut ctrl_c => Some(result),
        _ = std::future::ready(()) => None,
    };

    async move {
        let result = match early {
            Some(result) => result,
            None => ctrl_c.await,
        };
        if result.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ScriptStep, ScriptedProbe};
    use crate::sampler::RunEnd;

    fn app(count: u64) -> App {
        let mut config = Config::for_host("192.0.2.1");
        config.count = Some(count);
        config.interval_secs = 0.01;
        config.enable_color = false;
        App::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_preflight_ready() {
        let probe = ScriptedProbe::replies([0.05]);
        assert_eq!(app(1).preflight(&probe).await.unwrap(), PreflightStatus::Ready);
    }

    #[tokio::test]
    async fn test_preflight_timeout_is_not_fatal() {
        let probe = ScriptedProbe::new([ScriptStep::Timeout]);
        assert_eq!(app(1).preflight(&probe).await.unwrap(), PreflightStatus::NoReply);
    }

    #[tokio::test]
    async fn test_preflight_error_propagates() {
        let probe = ScriptedProbe::new([ScriptStep::Fail("Operation not permitted".to_string())]);
        let err = app(1).preflight(&probe).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Operation not permitted"));
    }

    #[tokio::test]
    async fn test_interrupt_signal_waits_for_ctrl_c() {
        let shutdown = interrupt_signal().await;
        let waited = tokio::time::timeout(std::time::Duration::from_millis(50), shutdown).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_scripted_probe() {
        let app = app(3);
        let mut out = Vec::new();
        let report = app
            .run_with(
                ScriptedProbe::replies([10.0, 20.0, 30.0]),
                &mut out,
                std::future::pending(),
            )
            .await
            .unwrap();

        assert_eq!(report.end, RunEnd::Completed);
        assert_eq!(report.counters.sent, 3);
        assert_eq!(report.summary.unwrap().avg_ms, 20.0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("PING 192.0.2.1"));
        assert!(text.contains("3 packets transmitted, 3 received, 0.0% packet loss"));
    }
}
