//! Command-line parsing for `statpull`.
//!
//! Flags only pre-answer the interactive prompts; with no flags the tool asks
//! for everything it needs (see `selector`).

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod selector;

#[derive(Debug, Parser)]
#[command(
    name = "statpull",
    version,
    about = "Pull Census, BLS and BEA datasets into CSV files"
)]
pub struct Cli {
    /// Operation to run (1-4). Prompts when omitted.
    #[arg(short = 'o', long, value_name = "N")]
    pub operation: Option<String>,

    /// Two-digit state FIPS code for operation 2. Prompts when omitted.
    #[arg(long, value_name = "CODE")]
    pub fips: Option<String>,

    /// Directory output files are written to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Per-request timeout in seconds (overrides STATPULL_TIMEOUT_SECS).
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
