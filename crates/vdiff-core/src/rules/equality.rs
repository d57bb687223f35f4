use std::collections::HashSet;

use crate::errors::Result;
use crate::model::{NodeId, VariationDiff};

/// Structural equality of two diffs
///
/// Compares diff type, node type, line numbers, formula and label of each
/// node pair, then recurses into the de-duplicated children in order.
/// Closing lines are not compared. A node of `a` reached a second time
/// counts as equal, so shared NON nodes are compared once.
///
/// # Errors
/// * `UnknownNode` - If an edge points outside either arena
pub fn is_same_as(a: &VariationDiff, b: &VariationDiff) -> Result<bool> {
    let mut visited = HashSet::new();
    same_subtree(a, a.root(), b, b.root(), &mut visited)
}

fn same_subtree(
    a: &VariationDiff,
    a_id: NodeId,
    b: &VariationDiff,
    b_id: NodeId,
    visited: &mut HashSet<NodeId>,
) -> Result<bool> {
    if !visited.insert(a_id) {
        return Ok(true);
    }

    let left = a.node(a_id)?;
    let right = b.node(b_id)?;
    if left.diff_type() != right.diff_type()
        || left.node_type() != right.node_type()
        || left.from != right.from
        || left.to != right.to
        || left.formula() != right.formula()
        || left.label() != right.label()
    {
        return Ok(false);
    }

    let left_children = a.all_children(a_id)?;
    let right_children = b.all_children(b_id)?;
    if left_children.len() != right_children.len() {
        return Ok(false);
    }
    for (l, r) in left_children.into_iter().zip(right_children) {
        if !same_subtree(a, l, b, r, visited)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffLineNumber, DiffType, Time};
    use crate::ops::copy_ops::deep_copy;
    use crate::ops::graph_ops::add_child;
    use crate::ops::node_ops::create_artifact;

    fn one_child(label: &str) -> VariationDiff {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = create_artifact(
            &mut diff,
            DiffType::Add,
            DiffLineNumber::new(1, -1, 1),
            DiffLineNumber::new(2, -1, 2),
            vec![label.into()],
        );
        add_child(&mut diff, root, a, Time::After).unwrap();
        diff
    }

    #[test]
    fn test_deep_copy_is_same() {
        let diff = one_child("x");
        let copy = deep_copy(&diff).unwrap();
        assert!(is_same_as(&diff, &copy).unwrap());
    }

    #[test]
    fn test_label_difference_is_detected() {
        assert!(!is_same_as(&one_child("x"), &one_child("y")).unwrap());
        assert!(!is_same_as(&one_child("x"), &VariationDiff::default()).unwrap());
    }
}
