//! Command-line interface for skillsync.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;
pub mod prompt;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "skillsync",
    version,
    about = "Keep skill documents in sync across agent platforms"
)]
pub struct Cli {
    /// Machine-readable JSON output on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Explicit config file (skips global and project config)
    #[arg(long, global = true, env = "SKILLSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root holding the canonical and platform folders
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
