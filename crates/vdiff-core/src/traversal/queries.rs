use crate::errors::Result;
use crate::model::{DiffNode, NodeId, StableId, VariationDiff};

use super::preorder::preorder;

/// Whether any reachable node satisfies `condition`
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn any_match(diff: &VariationDiff, condition: impl Fn(&DiffNode) -> bool) -> Result<bool> {
    for id in preorder(diff)? {
        if condition(diff.node(id)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn all_match(diff: &VariationDiff, condition: impl Fn(&DiffNode) -> bool) -> Result<bool> {
    Ok(!any_match(diff, |node| !condition(node))?)
}

/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn none_match(diff: &VariationDiff, condition: impl Fn(&DiffNode) -> bool) -> Result<bool> {
    Ok(!any_match(diff, condition)?)
}

/// Reachable nodes satisfying `condition`, in preorder
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn compute_all_nodes_that(
    diff: &VariationDiff,
    condition: impl Fn(&DiffNode) -> bool,
) -> Result<Vec<NodeId>> {
    let mut out = Vec::new();
    for id in preorder(diff)? {
        if condition(diff.node(id)?) {
            out.push(id);
        }
    }
    Ok(out)
}

/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn compute_artifact_nodes(diff: &VariationDiff) -> Result<Vec<NodeId>> {
    compute_all_nodes_that(diff, DiffNode::is_artifact)
}

/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn compute_annotation_nodes(diff: &VariationDiff) -> Result<Vec<NodeId>> {
    compute_all_nodes_that(diff, DiffNode::is_annotation)
}

/// Number of reachable nodes satisfying `condition`
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn count(diff: &VariationDiff, condition: impl Fn(&DiffNode) -> bool) -> Result<usize> {
    Ok(compute_all_nodes_that(diff, condition)?.len())
}

/// Number of reachable nodes, root included
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn compute_size(diff: &VariationDiff) -> Result<usize> {
    Ok(preorder(diff)?.len())
}

/// Whether the root has no children at either time
///
/// # Errors
/// * `UnknownNode` - If the root is missing from the arena
pub fn is_empty(diff: &VariationDiff) -> Result<bool> {
    diff.is_leaf(diff.root())
}

/// Reachable node carrying `id`, if any
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn node_with_stable_id(diff: &VariationDiff, id: StableId) -> Result<Option<NodeId>> {
    for node in preorder(diff)? {
        if diff.node(node)?.stable_id() == id {
            return Ok(Some(node));
        }
    }
    Ok(None)
}
