//! Transform command
//!
//! Usage: vdiff transform <DIFF> [--cut] [--collapse-nested] [--moved] [--output FILE]

use clap::Args;
use std::path::PathBuf;
use vdiff_core::transform::{
    CollapseNestedNonEditedAnnotations, CutNonEditedSubtrees, NaiveMovedArtifactDetection,
};
use vdiff_core::{apply_transformers, unparse_diff, VariationDiffTransformer};

use super::{load_diff, CommonArgs};

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Diff file to transform
    pub diff: PathBuf,

    /// Merge removed and added lines with equal text
    #[arg(long)]
    pub moved: bool,

    /// Cut subtrees without edits
    #[arg(long)]
    pub cut: bool,

    /// Merge chains of unchanged annotations (requires --cut)
    #[arg(long)]
    pub collapse_nested: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl TransformArgs {
    /// Selected transformers, in the order they run
    fn transformers(&self) -> Vec<&'static dyn VariationDiffTransformer> {
        let mut selected: Vec<&'static dyn VariationDiffTransformer> = Vec::new();
        if self.moved {
            selected.push(&NaiveMovedArtifactDetection);
        }
        if self.cut {
            selected.push(&CutNonEditedSubtrees);
        }
        if self.collapse_nested {
            selected.push(&CollapseNestedNonEditedAnnotations);
        }
        selected
    }
}

pub fn execute(args: TransformArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut diff = load_diff(&args.diff, &args.common)?;
    apply_transformers(&args.transformers(), &mut diff)?;
    let text = unparse_diff(&diff)?;
    args.common.write(&text)
}
