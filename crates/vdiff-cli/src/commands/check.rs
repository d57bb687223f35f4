//! Check command
//!
//! Usage: vdiff check <DIFF>

use clap::Args;
use std::path::PathBuf;
use vdiff_core::rules::is_consistent;

use super::{load_diff, CommonArgs};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Diff file to check
    pub diff: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff = load_diff(&args.diff, &args.common)?;

    let result = is_consistent(&diff);
    match result.failure() {
        None => args.common.write("consistent\n"),
        Some(failure) => Err(format!("inconsistent: {}", failure).into()),
    }
}
