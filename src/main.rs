//! ving - ping with a live latency chart

use clap::Parser;
use std::process;
use ving::{
    app::{App, PreflightStatus, PRIVILEGE_NOTE, PRIVILEGE_WARNING},
    cli::Cli,
    config::{parser::load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    probe::IcmpProbe,
};

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }

    // A host lookup cut short by Ctrl+C keeps running on the blocking pool;
    // the statistics are already printed, so do not wait for it
    process::exit(0);
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(cli)?;
    colored::control::set_override(config.enable_color);

    if config.debug {
        // Values the command line overrode are never validated otherwise
        for warning in EnvManager::validate_current_env() {
            eprintln!("{}", warning);
        }
    }

    let app = App::new(config)?;
    let probe = IcmpProbe::new();

    match app.preflight(&probe).await {
        Ok(PreflightStatus::Ready) => {}
        Ok(PreflightStatus::NoReply) => eprintln!("{}", PRIVILEGE_WARNING),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", PRIVILEGE_NOTE);
            process::exit(1);
        }
    }

    app.run(probe).await?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check VING_* variables and your .env file");
            eprintln!("  - Interval and timeout are positive seconds");
            eprintln!("  - Run with --help for accepted ranges");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("Output help:");
            eprintln!("  - Check that the log file directory exists and is writable");
        }
        _ => {}
    }
}
