//! Refine command
//!
//! Usage: vdiff refine <DIFF> [--output FILE]

use clap::Args;
use std::path::PathBuf;
use vdiff_core::{improve_matching, unparse_diff, GreedyMatcher};

use super::{load_diff, CommonArgs};

#[derive(Debug, Args)]
pub struct RefineArgs {
    /// Diff file to refine
    pub diff: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: RefineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut diff = load_diff(&args.diff, &args.common)?;
    improve_matching(&mut diff, &GreedyMatcher)?;
    let text = unparse_diff(&diff)?;
    args.common.write(&text)
}
