//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod hash;
pub mod status;
pub mod sync;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Sync(args) => sync::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::Hash(args) => hash::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile canonical and platform copies of every skill
    Sync(sync::SyncArgs),

    /// Report conflicts and drift without writing anything
    Status(status::StatusArgs),

    /// Print the recomputed and recorded canonical hash of a skill
    Hash(hash::HashArgs),
}
