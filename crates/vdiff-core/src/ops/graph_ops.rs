use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, Time, VariationDiff};

/// Attach `child` under `parent` at `time`, at position `index`
///
/// Updates both directions of the edge: the child's parent slot and the
/// parent's ordered child list.
///
/// # Arguments
/// * `diff` - Diff owning both nodes
/// * `parent` - New parent at `time`
/// * `child` - Node to attach
/// * `index` - Position in the parent's child list (may equal its length)
/// * `time` - Time of the edge
///
/// # Errors
/// * `UnknownNode` - If either handle does not belong to `diff`
/// * `ChildNotAtTime` - If `child` does not exist at `time`
/// * `ChildAlreadyHasParent` - If `child` already has a parent at `time`
/// * `IndexOutOfBounds` - If `index` is past the end of the child list
pub fn insert_child(
    diff: &mut VariationDiff,
    parent: NodeId,
    child: NodeId,
    index: usize,
    time: Time,
) -> Result<()> {
    let len = diff.node(parent)?.children(time).len();

    let child_node = diff.node(child)?;
    if !child_node.exists_at(time) {
        return Err(VariationDiffError::ChildNotAtTime {
            child,
            diff_type: child_node.diff_type(),
            time,
        });
    }
    if let Some(current) = child_node.parent(time) {
        return Err(VariationDiffError::ChildAlreadyHasParent {
            child,
            parent: current,
            time,
        });
    }
    if index > len {
        return Err(VariationDiffError::IndexOutOfBounds { parent, index, len });
    }

    diff.node_mut(parent)?.children[time.index()].insert(index, child);
    diff.node_mut(child)?.parents[time.index()] = Some(parent);
    Ok(())
}

/// Attach `child` as the last child of `parent` at `time`
///
/// # Errors
/// * `UnknownNode` - If either handle does not belong to `diff`
/// * `ChildNotAtTime` - If `child` does not exist at `time`
/// * `ChildAlreadyHasParent` - If `child` already has a parent at `time`
pub fn add_child(diff: &mut VariationDiff, parent: NodeId, child: NodeId, time: Time) -> Result<()> {
    let len = diff.node(parent)?.children(time).len();
    insert_child(diff, parent, child, len, time)
}

/// Attach several children in order after the existing ones
///
/// Stops at the first failing child; the children before it stay attached.
///
/// # Errors
/// Same as [`add_child`].
pub fn add_children(
    diff: &mut VariationDiff,
    parent: NodeId,
    children: &[NodeId],
    time: Time,
) -> Result<()> {
    for child in children {
        add_child(diff, parent, *child, time)?;
    }
    Ok(())
}

/// Detach `child` from `parent` at `time`
///
/// # Errors
/// * `UnknownNode` - If either handle does not belong to `diff`
/// * `NotAChild` - If `child` is not a child of `parent` at `time`
pub fn remove_child(
    diff: &mut VariationDiff,
    parent: NodeId,
    child: NodeId,
    time: Time,
) -> Result<()> {
    diff.node(parent)?;
    if !diff.is_child(parent, child, time)? {
        return Err(VariationDiffError::NotAChild {
            child,
            parent,
            time,
        });
    }

    diff.node_mut(parent)?.children[time.index()].retain(|c| *c != child);
    diff.node_mut(child)?.parents[time.index()] = None;
    Ok(())
}

/// Detach all children of `node` at `time` and return them in order
///
/// First half of the detach-then-reattach pattern used by split, join and
/// subtree moves.
///
/// # Errors
/// * `UnknownNode` - If `node` or one of its children does not belong to `diff`
pub fn remove_children(diff: &mut VariationDiff, node: NodeId, time: Time) -> Result<Vec<NodeId>> {
    let children = std::mem::take(&mut diff.node_mut(node)?.children[time.index()]);
    for child in &children {
        diff.node_mut(*child)?.parents[time.index()] = None;
    }
    Ok(children)
}

/// Detach `node` from its parent at `time`, if it has one
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
pub fn drop_at(diff: &mut VariationDiff, node: NodeId, time: Time) -> Result<()> {
    match diff.parent(node, time)? {
        Some(parent) => remove_child(diff, parent, node, time),
        None => Ok(()),
    }
}

/// Detach `node` from its parents at both times
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
pub fn drop_node(diff: &mut VariationDiff, node: NodeId) -> Result<()> {
    for time in Time::ALL {
        drop_at(diff, node, time)?;
    }
    Ok(())
}

/// Attach `node` below the given parents at the times it exists
///
/// Inverse of [`drop_node`]. A parent is only used if the node exists at
/// its time; `None` leaves that time untouched.
///
/// # Returns
/// Whether at least one edge was added
///
/// # Errors
/// Same as [`add_child`].
pub fn add_below(
    diff: &mut VariationDiff,
    node: NodeId,
    before_parent: Option<NodeId>,
    after_parent: Option<NodeId>,
) -> Result<bool> {
    let diff_type = diff.node(node)?.diff_type();
    let mut attached = false;
    for time in diff_type.times() {
        if let Some(parent) = time.select(before_parent, after_parent) {
            add_child(diff, parent, node, time)?;
            attached = true;
        }
    }
    Ok(attached)
}

/// Move all children of `other` onto `this`, at both times
///
/// The moved children are appended after the existing children of `this`.
///
/// # Errors
/// * `UnknownNode` - If either handle does not belong to `diff`
/// * `ChildNotAtTime` - If `this` cannot take a child at some time
pub fn steal_children_of(diff: &mut VariationDiff, this: NodeId, other: NodeId) -> Result<()> {
    diff.node(this)?;
    for time in Time::ALL {
        let children = remove_children(diff, other, time)?;
        add_children(diff, this, &children, time)?;
    }
    Ok(())
}

/// Remove a non-root node and hand its children to its parents
///
/// At each time, the children take the removed node's place in the parent's
/// child list, keeping their relative order.
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
/// * `CannotRemoveRoot` - If `node` is the root
pub fn remove_node(diff: &mut VariationDiff, node: NodeId) -> Result<()> {
    if node == diff.root() || diff.node(node)?.is_root() {
        return Err(VariationDiffError::CannotRemoveRoot);
    }

    for time in Time::ALL {
        let Some(parent) = diff.parent(node, time)? else {
            continue;
        };
        let index = diff
            .index_of_child(parent, node, time)?
            .ok_or(VariationDiffError::InconsistentEdge {
                parent,
                child: node,
                time,
            })?;

        remove_child(diff, parent, node, time)?;
        let children = remove_children(diff, node, time)?;
        for (offset, child) in children.into_iter().enumerate() {
            insert_child(diff, parent, child, index + offset, time)?;
        }
    }
    Ok(())
}
