//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - parses CLI arguments and sets up logging
//! - builds the run configuration
//! - resolves the operation (flags or interactive menu)
//! - runs the pull and reports where the output went

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::cli::selector::{operation_for_choice, select_operation, validate_choice};
use crate::config::Config;
use crate::data::HttpTransport;
use crate::domain::Operation;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `statpull` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init_logging(cli.verbose, cli.quiet);

    let config = config_from_cli(&cli, Config::from_env()?)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let operation = resolve_operation(&cli, &mut stdin.lock(), &mut stdout.lock())?;

    info!(operation = %operation, timeout_secs = config.timeout.as_secs(), "starting pull");
    let transport = HttpTransport::new(config.timeout)?;

    match pipeline::run_operation(&operation, &config, &transport)? {
        Some(path) => println!("Saved {operation} as '{}'", path.display()),
        None => println!("No {operation} pulled; nothing written."),
    }
    Ok(())
}

/// Apply command-line overrides on top of the environment configuration.
pub fn config_from_cli(cli: &Cli, mut config: Config) -> Result<Config, AppError> {
    config.out_dir = cli.out_dir.clone();
    match cli.timeout_secs {
        Some(0) => {
            return Err(AppError::config(
                "Invalid --timeout-secs 0: expected a positive number of seconds.",
            ));
        }
        Some(secs) => config.timeout = Duration::from_secs(secs),
        None => {}
    }
    Ok(config)
}

/// Use `--operation`/`--fips` when given, prompting for whatever is missing.
pub fn resolve_operation<R: BufRead, W: Write>(
    cli: &Cli,
    input: &mut R,
    output: &mut W,
) -> Result<Operation, AppError> {
    let fips = cli.fips.as_deref();
    match &cli.operation {
        Some(raw) => operation_for_choice(input, output, &validate_choice(raw)?, fips),
        None => select_operation(input, output, fips),
    }
}
