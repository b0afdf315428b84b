//! Command-line interface

use crate::config::env::EnvManager;
use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  ving google.com
  ving -c 10 8.8.8.8
  ving -i 0.5 -W 2 example.com

Environment:
  VING_COUNT, VING_INTERVAL, VING_TIMEOUT, VING_MAX_POINTS,
  VING_ENABLE_COLOR and VING_LOG_FILE provide defaults; a .env file in
  the working directory is read as well. Command-line values win.";

/// `--help` text: the short epilogue followed by the full variable list
fn after_long_help() -> String {
    format!("{}\n\n{}", AFTER_HELP, EnvManager::display_env_help())
}

/// Ping utility with terminal-based latency chart
#[derive(Parser, Debug, Clone)]
#[command(name = "ving")]
#[command(version, about, long_about = None)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT"), ", built ", env!("BUILD_TIME"), ")"))]
#[command(after_help = AFTER_HELP, after_long_help = after_long_help())]
pub struct Cli {
    /// Target host to ping
    pub host: String,

    /// Number of pings to send (default: infinite)
    #[arg(short, long, value_parser = parse_count)]
    pub count: Option<u64>,

    /// Wait interval seconds between pings (default: 1.0)
    #[arg(short, long, value_parser = parse_seconds)]
    pub interval: Option<f64>,

    /// Time to wait for response in seconds (default: 4.0)
    #[arg(short = 'W', long, value_parser = parse_seconds)]
    pub timeout: Option<f64>,

    /// Maximum points to display on chart (default: 50)
    #[arg(short, long, value_parser = parse_max_points)]
    pub max_points: Option<usize>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Write log entries to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolve the color flags; `None` leaves the decision to configuration
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

/// Parse a positive, finite number of seconds
fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid duration: {}", s))?;

    if !secs.is_finite() {
        Err(format!("Invalid duration: {}", s))
    } else if secs <= 0.0 {
        Err("Duration must be greater than 0".to_string())
    } else {
        Ok(secs)
    }
}

fn parse_count(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("Count must be greater than 0".to_string()),
        Ok(count) => Ok(count),
        Err(_) => Err(format!("Invalid count: {}", s)),
    }
}

fn parse_max_points(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Max points must be greater than 0".to_string()),
        Ok(points) if points > crate::defaults::MAX_POINTS_LIMIT => Err(format!(
            "Max points cannot exceed {}",
            crate::defaults::MAX_POINTS_LIMIT
        )),
        Ok(points) => Ok(points),
        Err(_) => Err(format!("Invalid max points: {}", s)),
    }
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["ving", "example.com"]);
        assert_eq!(cli.host, "example.com");
        assert_eq!(cli.count, None);
        assert_eq!(cli.interval, None);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.max_points, None);
        assert!(!cli.verbose);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "ving", "-c", "10", "-i", "0.5", "-W", "2", "-m", "20", "8.8.8.8",
        ]);
        assert_eq!(cli.host, "8.8.8.8");
        assert_eq!(cli.count, Some(10));
        assert_eq!(cli.interval, Some(0.5));
        assert_eq!(cli.timeout, Some(2.0));
        assert_eq!(cli.max_points, Some(20));
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "ving",
            "--count", "3",
            "--interval", "2",
            "--timeout", "1.5",
            "--max-points", "5",
            "--no-color",
            "--verbose",
            "--log-file", "/tmp/ving.log",
            "example.org",
        ]);
        assert_eq!(cli.count, Some(3));
        assert_eq!(cli.interval, Some(2.0));
        assert_eq!(cli.timeout, Some(1.5));
        assert_eq!(cli.max_points, Some(5));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/ving.log")));
    }

    #[test]
    fn test_host_is_required() {
        assert!(Cli::try_parse_from(["ving"]).is_err());
    }

    #[test]
    fn test_seconds_parsing() {
        assert_eq!(parse_seconds("1").unwrap(), 1.0);
        assert_eq!(parse_seconds("0.25").unwrap(), 0.25);

        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("abc").is_err());
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("").is_err());
    }

    #[test]
    fn test_count_and_points_parsing() {
        assert_eq!(parse_count("5").unwrap(), 5);
        assert!(parse_count("0").is_err());
        assert!(parse_count("-3").is_err());
        assert!(parse_count("2.5").is_err());

        assert_eq!(parse_max_points("50").unwrap(), 50);
        assert!(parse_max_points("0").is_err());
        assert!(parse_max_points("10001").is_err());
    }

    #[test]
    fn test_invalid_values_rejected_by_clap() {
        assert!(Cli::try_parse_from(["ving", "-c", "0", "host"]).is_err());
        assert!(Cli::try_parse_from(["ving", "-i", "0", "host"]).is_err());
        assert!(Cli::try_parse_from(["ving", "-W", "-2", "host"]).is_err());
        assert!(Cli::try_parse_from(["ving", "-m", "0", "host"]).is_err());
    }

    #[test]
    fn test_long_help_lists_environment() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("VING_LOG_FILE"));
        assert!(help.contains("Configuration Priority"));

        let short = Cli::command().render_help().to_string();
        assert!(!short.contains("Supported Environment Variables:"));
    }

    #[test]
    fn test_color_flags() {
        let cli = Cli::parse_from(["ving", "--no-color", "host"]);
        assert_eq!(cli.color_override(), Some(false));
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["ving", "--color", "host"]);
        assert_eq!(cli.color_override(), Some(true));
        assert!(cli.use_colors());

        let cli = Cli::parse_from(["ving", "host"]);
        assert_eq!(cli.color_override(), None);

        assert!(Cli::try_parse_from(["ving", "--color", "--no-color", "host"]).is_err());
    }
}
