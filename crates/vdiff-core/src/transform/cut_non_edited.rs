//! Removal of unchanged subtrees

use std::collections::HashSet;

use super::VariationDiffTransformer;
use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, Time, VariationDiff};
use crate::ops::graph_ops::drop_node;

/// Cut every subtree that contains no edit
///
/// Works bottom-up: an unchanged leaf with the same parent at both times is
/// dropped, which may turn its parent into such a leaf. What remains is the
/// edited code together with the annotations around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CutNonEditedSubtrees;

impl CutNonEditedSubtrees {
    pub const NAME: &'static str = "CutNonEditedSubtrees";
}

impl VariationDiffTransformer for CutNonEditedSubtrees {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn transform(&self, diff: &mut VariationDiff) -> Result<()> {
        let mut visited = HashSet::new();
        let mut cut = 0;
        let root = diff.root();
        cut_below(diff, root, &mut visited, &mut cut)?;
        tracing::debug!(cut, "cut unchanged leaves");
        Ok(())
    }
}

fn cut_below(
    diff: &mut VariationDiff,
    subtree: NodeId,
    visited: &mut HashSet<NodeId>,
    cut: &mut usize,
) -> Result<()> {
    if !visited.insert(subtree) {
        return Ok(());
    }
    if visited.len() > diff.arena_len() {
        return Err(VariationDiffError::OrphanOrCycle { node: subtree });
    }

    for child in diff.all_children(subtree)? {
        cut_below(diff, child, visited, cut)?;
    }

    for child in diff.all_children(subtree)? {
        if is_unchanged_leaf_of(diff, subtree, child)? {
            drop_node(diff, child)?;
            *cut += 1;
        }
    }
    Ok(())
}

fn is_unchanged_leaf_of(diff: &VariationDiff, parent: NodeId, child: NodeId) -> Result<bool> {
    let node = diff.node(child)?;
    Ok(diff.is_leaf(child)?
        && node.parent(Time::Before) == Some(parent)
        && node.parent(Time::After) == Some(parent))
}
