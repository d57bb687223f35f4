use std::collections::HashMap;

use crate::errors::{Result, VariationDiffError};
use crate::model::{
    ClosingLine, DiffLineNumber, DiffSource, DiffType, NodeId, Time, VariationDiff, VariationTree,
};
use crate::traversal;

use super::graph_ops::add_child;

/// Copy the payload of `node` into a new detached node
///
/// Type, label, formula, line range and closing lines are duplicated;
/// edges are not.
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
pub fn shallow_copy(diff: &mut VariationDiff, node: NodeId) -> Result<NodeId> {
    let copy = diff.node(node)?.detached_copy();
    Ok(diff.push_node(copy))
}

/// Copy the reachable graph into a fresh, compact arena
///
/// Nodes reachable along both chains are copied once, so shared NON nodes
/// stay shared. Detached nodes of the source arena are left behind.
///
/// # Errors
/// * `OrphanOrCycle` - If a reachable node has a parent outside the reachable graph
pub fn deep_copy(diff: &VariationDiff) -> Result<VariationDiff> {
    let order = traversal::preorder(diff)?;

    let mut copy = VariationDiff::new(diff.source().clone());
    let mut memo: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len());
    for id in &order {
        let payload = diff.node(*id)?.detached_copy();
        let new_id = if *id == diff.root() {
            *copy.node_mut(copy.root())? = payload;
            copy.root()
        } else {
            copy.push_node(payload)
        };
        memo.insert(*id, new_id);
    }

    for id in &order {
        let old = diff.node(*id)?;
        let new_id = memo
            .get(id)
            .copied()
            .ok_or(VariationDiffError::UnknownNode { node: *id })?;
        for time in Time::ALL {
            let parent = match old.parent(time) {
                Some(parent) => Some(
                    *memo
                        .get(&parent)
                        .ok_or(VariationDiffError::OrphanOrCycle { node: *id })?,
                ),
                None => None,
            };
            let children = old
                .children(time)
                .iter()
                .map(|c| {
                    memo.get(c)
                        .copied()
                        .ok_or(VariationDiffError::OrphanOrCycle { node: *c })
                })
                .collect::<Result<Vec<_>>>()?;

            let target = copy.node_mut(new_id)?;
            target.parents[time.index()] = parent;
            target.children[time.index()] = children;
        }
    }
    Ok(copy)
}

/// Project `diff` at `time` into a new all-NON tree
///
/// Each node existing at `time` is copied once, attached at both times to the
/// copy of its parent at `time`. Line numbers collapse to the position at
/// `time`, labels are kept.
///
/// # Errors
/// * `UnknownNode` - If the graph references a node outside the arena
pub fn project(diff: &VariationDiff, time: Time) -> Result<VariationTree> {
    let mut tree = VariationDiff::new(DiffSource::Projected {
        source: Box::new(diff.source().clone()),
        time,
    });

    let root = diff.root();
    {
        let payload = diff.node(root)?.detached_copy();
        let tree_root = tree.root();
        *tree.node_mut(tree_root)? = payload;
        normalize_projected(&mut tree, tree_root, time)?;
    }

    let mut stack = vec![(root, tree.root())];
    while let Some((old, new)) = stack.pop() {
        let children = diff.children(old, time)?.to_vec();
        for child in children {
            let copy = shallow_copy_into(diff, child, &mut tree)?;
            normalize_projected(&mut tree, copy, time)?;
            for t in Time::ALL {
                add_child(&mut tree, new, copy, t)?;
            }
            stack.push((child, copy));
        }
    }

    Ok(VariationTree::from_diff_unchecked(tree))
}

/// Treat a variation tree as a diff in which nothing changed
///
/// The result is a fresh arena; the input stays untouched.
///
/// # Errors
/// * `UnknownNode` - If the tree references a node outside its arena
pub fn unchanged(tree: &VariationTree) -> Result<VariationDiff> {
    let mut diff = project(tree.as_diff(), Time::Before)?.into_diff();
    diff.set_source(tree.source().clone());
    Ok(diff)
}

fn shallow_copy_into(from: &VariationDiff, node: NodeId, into: &mut VariationDiff) -> Result<NodeId> {
    let payload = from.node(node)?.detached_copy();
    Ok(into.push_node(payload))
}

fn normalize_projected(tree: &mut VariationDiff, node: NodeId, time: Time) -> Result<()> {
    let target = tree.node_mut(node)?;
    target.diff_type = DiffType::Non;
    target.from = collapse_to(target.from, time);
    target.to = collapse_to(target.to, time);

    let closing = target.closing[time.index()].take().map(|c| ClosingLine {
        diff_type: DiffType::Non,
        line: collapse_to(c.line, time),
        label: c.label,
    });
    target.closing = [closing.clone(), closing];
    Ok(())
}

fn collapse_to(line: DiffLineNumber, time: Time) -> DiffLineNumber {
    let at = line.at_time(time);
    DiffLineNumber::new(at, at, at)
}
