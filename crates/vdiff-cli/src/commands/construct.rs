//! Construct command
//!
//! Usage: vdiff construct <BEFORE> <AFTER> [--output FILE]

use clap::Args;
use std::path::{Path, PathBuf};
use vdiff_core::{diff_using_matching, unparse_diff, GreedyMatcher, VariationDiffParser, VariationTree};

use super::{read_file, source_of, CommonArgs};

#[derive(Debug, Args)]
pub struct ConstructArgs {
    /// Source file before the edit
    pub before: PathBuf,

    /// Source file after the edit
    pub after: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn execute(args: ConstructArgs) -> Result<(), Box<dyn std::error::Error>> {
    let before = load_tree(&args.before, &args.common)?;
    let after = load_tree(&args.after, &args.common)?;

    let diff = diff_using_matching(&before, &after, &GreedyMatcher)?;
    let text = unparse_diff(&diff)?;
    args.common.write(&text)
}

fn load_tree(path: &Path, common: &CommonArgs) -> Result<VariationTree, Box<dyn std::error::Error>> {
    let text = read_file(path)?;
    let tree = VariationDiffParser::new(common.parse_options()?)
        .parse_variation_tree(&text, source_of(path))?;
    Ok(tree)
}
