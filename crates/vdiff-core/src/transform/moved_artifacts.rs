//! Detection of code that was only moved

use super::{place, slot, VariationDiffTransformer};
use crate::errors::Result;
use crate::model::{DiffLineNumber, DiffType, NodeId, Time, VariationDiff};
use crate::ops::graph_ops::{drop_node, steal_children_of};
use crate::ops::node_ops::create_artifact;
use crate::traversal::compute_artifact_nodes;

/// Merge removed and added artifacts with the same text into one unchanged node
///
/// Pairs are found by comparing trimmed label text only, so two unrelated
/// lines with equal text are merged as well. The merged node keeps the
/// removed line's position before the edit and the added line's position
/// after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveMovedArtifactDetection;

impl NaiveMovedArtifactDetection {
    pub const NAME: &'static str = "NaiveMovedArtifactDetection";
}

impl VariationDiffTransformer for NaiveMovedArtifactDetection {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn transform(&self, diff: &mut VariationDiff) -> Result<()> {
        let twins = find_twins(diff)?;
        tracing::debug!(pairs = twins.len(), "moved artifacts found");
        for (removed, added) in twins {
            merge(diff, removed, added)?;
        }
        Ok(())
    }
}

/// Pairs of (removed, added) artifacts with equal text
fn find_twins(diff: &VariationDiff) -> Result<Vec<(NodeId, NodeId)>> {
    let mut candidates = compute_artifact_nodes(diff)?;
    let mut twins = Vec::new();

    while let Some(node_id) = candidates.pop() {
        let node = diff.node(node_id)?;
        if node.is_non() {
            continue;
        }
        let text = node.label().to_string();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let wanted = node.diff_type().inverse();
        let mut twin = None;
        for (position, other) in candidates.iter().enumerate() {
            let other_node = diff.node(*other)?;
            if other_node.diff_type() == wanted && other_node.label().to_string().trim() == text {
                twin = Some(position);
                break;
            }
        }

        if let Some(position) = twin {
            let other = candidates.remove(position);
            let pair = if node.is_rem() {
                (node_id, other)
            } else {
                (other, node_id)
            };
            twins.push(pair);
        }
    }
    Ok(twins)
}

fn merge(diff: &mut VariationDiff, removed: NodeId, added: NodeId) -> Result<()> {
    let before = slot(diff, removed, Time::Before)?;
    let after = slot(diff, added, Time::After)?;

    let (rem, add) = (diff.node(removed)?, diff.node(added)?);
    let from = DiffLineNumber::new(
        rem.from.in_diff.min(add.from.in_diff),
        rem.from.before_edit,
        add.from.after_edit,
    );
    let to = DiffLineNumber::new(
        rem.to.in_diff.max(add.to.in_diff),
        rem.to.before_edit,
        add.to.after_edit,
    );
    let lines = add.label().lines().to_vec();
    let merged = create_artifact(diff, DiffType::Non, from, to, lines);

    drop_node(diff, removed)?;
    drop_node(diff, added)?;
    steal_children_of(diff, merged, removed)?;
    steal_children_of(diff, merged, added)?;
    place(diff, merged, before, after)
}
