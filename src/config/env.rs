//! Environment variable handling and .env file management

use crate::defaults;
use crate::error::{AppError, ErrorContext, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an environment file if it exists; returns whether it was loaded.
    /// Variables already present in the process environment are kept.
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;

        Ok(true)
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "VING_COUNT" => {
                let count: u64 = value.parse()
                    .map_err(|e| {
                        AppError::config(format!("Invalid VING_COUNT value '{}': {}", value, e))
                    })?;
                if count == 0 {
                    return Err(AppError::config("VING_COUNT must be at least 1"));
                }
            }
            "VING_INTERVAL" => {
                Self::validate_seconds(key, value, defaults::MAX_INTERVAL_SECS)?;
            }
            "VING_TIMEOUT" => {
                Self::validate_seconds(key, value, defaults::MAX_TIMEOUT_SECS)?;
            }
            "VING_MAX_POINTS" => {
                let points: usize = value.parse()
                    .map_err(|e| {
                        AppError::config(format!("Invalid VING_MAX_POINTS value '{}': {}", value, e))
                    })?;
                if points == 0 || points > defaults::MAX_POINTS_LIMIT {
                    return Err(AppError::config(format!(
                        "VING_MAX_POINTS must be between 1 and {}, got: {}",
                        defaults::MAX_POINTS_LIMIT,
                        points
                    )));
                }
            }
            "VING_ENABLE_COLOR" => {
                value.to_lowercase().parse::<bool>()
                    .map_err(|e| {
                        AppError::config(format!("Invalid VING_ENABLE_COLOR value '{}': {}", value, e))
                    })?;
            }
            "VING_LOG_FILE" => {
                if value.is_empty() {
                    return Err(AppError::config("VING_LOG_FILE cannot be empty"));
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_seconds(key: &str, value: &str, max: f64) -> Result<()> {
        let secs: f64 = value.parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if !secs.is_finite() || secs <= 0.0 || secs > max {
            return Err(AppError::config(format!(
                "{} must be between 0 and {} seconds, got: {}",
                key, max, value
            )));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("VING_COUNT", "Number of pings to send", "10"),
            ("VING_INTERVAL", "Seconds between pings", "1.0"),
            ("VING_TIMEOUT", "Seconds to wait for each reply (max 300)", "4.0"),
            ("VING_MAX_POINTS", "Points kept on the chart (1-10000)", "50"),
            ("VING_ENABLE_COLOR", "Enable colored output", "true"),
            ("VING_LOG_FILE", "Write log entries to this file", "/tmp/ving.log"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }
}
