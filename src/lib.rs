//! ving
//!
//! A ping utility that sends ICMP echo requests at a fixed interval and
//! redraws a latency chart with running statistics in place after every
//! probe.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod sampler;
pub mod stats;

// Re-export commonly used types
pub use app::{App, PreflightStatus};
pub use error::{AppError, Result};
pub use models::Config;
pub use probe::{IcmpProbe, Probe, ProbeOutcome, ScriptedProbe};
pub use sampler::{RunEnd, RunReport, Sampler, SamplerSettings};
pub use stats::{LatencyHistory, PacketCounters, SlidingWindow};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Set by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;
    pub const DEFAULT_TIMEOUT_SECS: f64 = 4.0;
    pub const DEFAULT_MAX_POINTS: usize = 50;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_INTERVAL_SECS: f64 = 3600.0;
    pub const MAX_TIMEOUT_SECS: f64 = 300.0;
    pub const MAX_POINTS_LIMIT: usize = 10_000;

    /// Host and timeout of the start-up reachability check
    pub const PREFLIGHT_HOST: &str = "127.0.0.1";
    pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Chart size in terminal cells
    pub const CHART_WIDTH: u16 = 80;
    pub const CHART_HEIGHT: u16 = 15;
}
