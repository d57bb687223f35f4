//! Project command
//!
//! Usage: vdiff project <DIFF> --time before|after

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use vdiff_core::{print_source, Time};

use super::{load_diff, CommonArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeArg {
    Before,
    After,
}

impl From<TimeArg> for Time {
    fn from(time: TimeArg) -> Self {
        match time {
            TimeArg::Before => Time::Before,
            TimeArg::After => Time::After,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Diff file to project
    pub diff: PathBuf,

    /// Side of the edit to print
    #[arg(short, long, value_enum)]
    pub time: TimeArg,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff = load_diff(&args.diff, &args.common)?;
    let text = print_source(&diff, args.time.into())?;
    args.common.write(&text)
}
