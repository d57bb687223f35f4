//! Unparse command
//!
//! Usage: vdiff unparse <DIFF> [--collapse] [--output FILE]

use clap::Args;
use std::path::PathBuf;
use vdiff_core::unparse_diff;

use super::{load_diff, CommonArgs};

#[derive(Debug, Args)]
pub struct UnparseArgs {
    /// Diff file to parse and print again
    pub diff: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: UnparseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff = load_diff(&args.diff, &args.common)?;
    let text = unparse_diff(&diff)?;
    args.common.write(&text)
}
