//! Configuration data model and validation

use crate::defaults;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target host to probe
    #[serde(default)]
    pub host: String,

    /// Number of probes to send; `None` runs until cancelled
    #[serde(default)]
    pub count: Option<u64>,

    /// Seconds to wait between probes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,

    /// Seconds to wait for each echo reply
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Capacity of the chart's sliding window
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Write log entries to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            count: None,
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_points: default_max_points(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Create a configuration for `host` with default values
    pub fn for_host<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Interval between probes as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    /// Per-probe timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::config("Target host cannot be empty"));
        }

        if self.count == Some(0) {
            return Err(AppError::config("Count must be greater than 0"));
        }

        validate_seconds("Interval", self.interval_secs, defaults::MAX_INTERVAL_SECS)?;
        validate_seconds("Timeout", self.timeout_secs, defaults::MAX_TIMEOUT_SECS)?;

        if self.max_points == 0 {
            return Err(AppError::config("Max points must be greater than 0"));
        }

        if self.max_points > defaults::MAX_POINTS_LIMIT {
            return Err(AppError::config(format!(
                "Max points cannot exceed {}",
                defaults::MAX_POINTS_LIMIT
            )));
        }

        Ok(())
    }

    /// Merge `VING_*` environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(count) = std::env::var("VING_COUNT") {
            let count: u64 = count.trim().parse()
                .map_err(|e| {
                    AppError::config(format!("Invalid VING_COUNT value '{}': {}", count, e))
                })?;
            self.count = Some(count);
        }

        if let Ok(interval) = std::env::var("VING_INTERVAL") {
            self.interval_secs = interval.trim().parse()
                .map_err(|e| {
                    AppError::config(format!("Invalid VING_INTERVAL value '{}': {}", interval, e))
                })?;
        }

        if let Ok(timeout) = std::env::var("VING_TIMEOUT") {
            self.timeout_secs = timeout.trim().parse()
                .map_err(|e| {
                    AppError::config(format!("Invalid VING_TIMEOUT value '{}': {}", timeout, e))
                })?;
        }

        if let Ok(max_points) = std::env::var("VING_MAX_POINTS") {
            self.max_points = max_points.trim().parse()
                .map_err(|e| {
                    AppError::config(format!("Invalid VING_MAX_POINTS value '{}': {}", max_points, e))
                })?;
        }

        if let Ok(enable_color) = std::env::var("VING_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().to_lowercase().parse()
                .map_err(|e| {
                    AppError::config(format!("Invalid VING_ENABLE_COLOR value '{}': {}", enable_color, e))
                })?;
        }

        if let Ok(log_file) = std::env::var("VING_LOG_FILE") {
            let log_file = log_file.trim();
            if !log_file.is_empty() {
                self.log_file = Some(PathBuf::from(log_file));
            }
        }

        Ok(())
    }
}

fn validate_seconds(name: &str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::config(format!("{} must be a positive number of seconds", name)));
    }

    if value > max {
        return Err(AppError::config(format!("{} cannot exceed {} seconds", name, max)));
    }

    Ok(())
}

fn default_interval_secs() -> f64 {
    defaults::DEFAULT_INTERVAL_SECS
}

fn default_timeout_secs() -> f64 {
    defaults::DEFAULT_TIMEOUT_SECS
}

fn default_max_points() -> usize {
    defaults::DEFAULT_MAX_POINTS
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::for_host("example.com");
        assert_eq!(config.count, None);
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(4));
        assert_eq!(config.max_points, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host cannot be empty"));
    }

    #[test]
    fn test_count_must_be_positive() {
        let mut config = Config::for_host("example.com");
        config.count = Some(0);
        assert!(config.validate().is_err());

        config.count = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_must_be_positive_and_finite() {
        let mut config = Config::for_host("example.com");

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            config.interval_secs = bad;
            assert!(config.validate().is_err(), "interval {} accepted", bad);
        }
        config.interval_secs = 0.2;

        for bad in [0.0, -0.5, 301.0] {
            config.timeout_secs = bad;
            assert!(config.validate().is_err(), "timeout {} accepted", bad);
        }
        config.timeout_secs = 0.5;

        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_max_points_bounds() {
        let mut config = Config::for_host("example.com");
        config.max_points = 0;
        assert!(config.validate().is_err());

        config.max_points = defaults::MAX_POINTS_LIMIT + 1;
        assert!(config.validate().is_err());

        config.max_points = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"host": "1.1.1.1", "count": 3}"#).unwrap();
        assert_eq!(config.host, "1.1.1.1");
        assert_eq!(config.count, Some(3));
        assert_eq!(config.max_points, defaults::DEFAULT_MAX_POINTS);
        assert!(config.enable_color);
    }
}
