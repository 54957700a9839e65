//! Logging setup.
//!
//! Progress and per-call failures go through `tracing` to stderr, keeping
//! stdout for the menu and the final result line. `RUST_LOG` overrides the
//! level picked from the command-line flags.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity setting.
pub fn default_directive(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    format!("statpull={level}")
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
