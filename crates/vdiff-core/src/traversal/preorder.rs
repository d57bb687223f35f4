use crate::errors::{Result, VariationDiffError};
use crate::model::{DiffNode, NodeId, Time, VariationDiff};

/// All reachable nodes in preorder over both times
///
/// Children are visited before-children first. A NON node reachable along
/// both chains is listed once, at its first encounter.
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn preorder(diff: &VariationDiff) -> Result<Vec<NodeId>> {
    let mut visited = vec![false; diff.arena_len()];
    let mut order = Vec::new();
    let mut stack = vec![diff.root()];

    while let Some(id) = stack.pop() {
        let seen = visited
            .get_mut(id.index())
            .ok_or(VariationDiffError::UnknownNode { node: id })?;
        if *seen {
            continue;
        }
        *seen = true;
        order.push(id);

        let children = diff.all_children(id)?;
        stack.extend(children.into_iter().rev());
    }
    Ok(order)
}

/// Reachable nodes of the projection at `time`, in preorder
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn preorder_at(diff: &VariationDiff, time: Time) -> Result<Vec<NodeId>> {
    let mut order = Vec::new();
    let mut stack = vec![diff.root()];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(diff.children(id, time)?.iter().rev());
        if order.len() > diff.arena_len() {
            return Err(VariationDiffError::OrphanOrCycle { node: id });
        }
    }
    Ok(order)
}

/// Visit every reachable node once, in [`preorder`]
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
pub fn for_all(diff: &VariationDiff, mut visit: impl FnMut(NodeId, &DiffNode)) -> Result<()> {
    for id in preorder(diff)? {
        visit(id, diff.node(id)?);
    }
    Ok(())
}

/// Visit every node of the projection at `time`, in [`preorder_at`]
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
/// * `OrphanOrCycle` - If the child edges at `time` loop
pub fn for_all_preorder_at(
    diff: &VariationDiff,
    time: Time,
    mut visit: impl FnMut(NodeId, &DiffNode),
) -> Result<()> {
    for id in preorder_at(diff, time)? {
        visit(id, diff.node(id)?);
    }
    Ok(())
}
