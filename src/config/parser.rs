//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{supports_color, Cli},
    config::env::EnvManager,
    error::Result,
    models::Config,
};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read environment defaults from `path` instead of `./.env`
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::for_host(self.cli.host.trim());

        EnvManager::load_env_file_from(&self.env_file)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(count) = self.cli.count {
            config.count = Some(count);
        }

        if let Some(interval) = self.cli.interval {
            config.interval_secs = interval;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_secs = timeout;
        }

        if let Some(max_points) = self.cli.max_points {
            config.max_points = max_points;
        }

        config.enable_color = self
            .cli
            .color_override()
            .unwrap_or(config.enable_color && supports_color());

        if self.cli.log_file.is_some() {
            config.log_file = self.cli.log_file.clone();
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Host: {}", config.host));
    summary.push(format!(
        "Count: {}",
        config
            .count
            .map_or_else(|| "unlimited".to_string(), |c| c.to_string())
    ));
    summary.push(format!("Interval: {}s", config.interval_secs));
    summary.push(format!("Timeout: {}s", config.timeout_secs));
    summary.push(format!("Max Points: {}", config.max_points));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));
    if let Some(log_file) = &config.log_file {
        summary.push(format!("Log File: {}", log_file.display()));
    }

    summary.join("\n")
}
