//! Parse command
//!
//! Usage: vdiff parse <DIFF> [--json] [--output FILE]

use clap::Args;
use std::path::PathBuf;
use vdiff_core::render::{render_json, render_listing};

use super::{load_diff, CommonArgs};

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Diff file to parse
    pub diff: PathBuf,

    /// Emit a JSON document instead of a node listing
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff = load_diff(&args.diff, &args.common)?;

    let text = if args.json {
        let mut json = render_json(&diff)?;
        json.push('\n');
        json
    } else {
        render_listing(&diff)?
    };

    args.common.write(&text)
}
