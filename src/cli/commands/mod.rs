//! CLI command implementations

pub mod inspect;
pub mod merge;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::Result;

/// Dispatch the parsed arguments to the matching command runner.
///
/// Returns the process exit code.
pub async fn run(args: Args) -> Result<i32> {
    match args.command {
        Some(Commands::Merge(merge_args)) => merge::run_merge(merge_args).await,
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args),
        None => Ok(0),
    }
}
