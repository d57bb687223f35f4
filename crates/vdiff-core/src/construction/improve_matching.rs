use std::collections::HashMap;
use std::time::Instant;

use crate::errors::{Result, VariationDiffError};
use crate::matching::{run_matcher, MatchTree, Matcher, Matching};
use crate::model::{DiffType, NodeId, Time, VariationDiff};
use crate::ops::copy_ops::shallow_copy;
use crate::ops::graph_ops::{add_children, drop_at, insert_child, remove_children};
use crate::rules::invariants::check_node;
use crate::rules::validation::assert_consistency;
use crate::{log_op_end, log_op_error, log_op_start};

/// Re-run a matcher over an existing diff and apply its result
///
/// The implicit matching (every NON node matches itself) seeds `matcher`.
/// Visiting the BEFORE projection in preorder, unmatched nodes are split
/// into a REM/ADD pair and newly matched REM/ADD pairs are joined into one
/// NON node.
///
/// All edits happen on a working copy; `diff` is only replaced when every
/// step and the final consistency check succeed.
///
/// # Errors
/// * `MatchingContractViolation` - If the matcher breaks its contract
/// * `UnexpectedDiffType` - If a visited node ends up in the wrong state
/// * Any invariant violation found along the way
pub fn improve_matching(diff: &mut VariationDiff, matcher: &dyn Matcher) -> Result<()> {
    let op = "improve_matching";
    log_op_start!(op, node_count = diff.arena_len());
    let start = Instant::now();

    let improved = refine(diff, matcher).map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    *diff = improved;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        node_count = diff.arena_len()
    );
    Ok(())
}

fn refine(diff: &VariationDiff, matcher: &dyn Matcher) -> Result<VariationDiff> {
    let mut working = diff.clone();

    let src = MatchTree::from_projection(&working, Time::Before)?;
    let dst = MatchTree::from_projection(&working, Time::After)?;
    let seed = extract_matching(&working, &src, &dst)?;
    let matching = run_matcher(matcher, &src, &dst, seed)?;

    // Destination entries still name nodes that were split meanwhile
    let mut after_side: HashMap<NodeId, NodeId> = HashMap::new();

    for (s, entry) in src.nodes().iter().enumerate() {
        let before = entry.origin;
        let counterpart = matching
            .dst_for_src(s)
            .and_then(|d| dst.get(d))
            .filter(|d| d.label == entry.label);

        match counterpart {
            None => {
                if working.node(before)?.is_non() {
                    let clone = split_node(&mut working, before)?;
                    after_side.insert(before, clone);
                }
                require(&working, before, DiffType::Rem)?;
            }
            Some(target) if target.origin != before => {
                if working.node(before)?.is_non() {
                    let clone = split_node(&mut working, before)?;
                    after_side.insert(before, clone);
                }
                let mut after = after_side
                    .get(&target.origin)
                    .copied()
                    .unwrap_or(target.origin);
                if working.node(after)?.is_non() {
                    let clone = split_node(&mut working, after)?;
                    after_side.insert(after, clone);
                    after = clone;
                }
                join_node(&mut working, before, after)?;
                require(&working, before, DiffType::Non)?;
            }
            Some(_) => require(&working, before, DiffType::Non)?,
        }
        check_node(&working, before)?;
    }

    assert_consistency(&working)?;
    Ok(working)
}

fn require(diff: &VariationDiff, node: NodeId, expected: DiffType) -> Result<()> {
    let actual = diff.node(node)?.diff_type();
    if actual == expected {
        Ok(())
    } else {
        Err(VariationDiffError::UnexpectedDiffType {
            node,
            expected,
            actual,
        })
    }
}

/// The matching implied by NON nodes: each is paired with itself
///
/// # Errors
/// * `OrphanOrCycle` - If a NON node of `src` is missing from `dst`
/// * `MatchingContractViolation` - If a NON node appears twice
pub fn extract_matching(diff: &VariationDiff, src: &MatchTree, dst: &MatchTree) -> Result<Matching> {
    let dst_index: HashMap<NodeId, usize> = dst
        .nodes()
        .iter()
        .enumerate()
        .map(|(d, node)| (node.origin, d))
        .collect();

    let mut matching = Matching::new();
    for (s, node) in src.nodes().iter().enumerate() {
        if !diff.node(node.origin)?.is_non() {
            continue;
        }
        let d = dst_index
            .get(&node.origin)
            .copied()
            .ok_or(VariationDiffError::OrphanOrCycle { node: node.origin })?;
        if !matching.add(s, d) {
            return Err(VariationDiffError::MatchingContractViolation {
                reason: format!("node {} is reachable twice", node.origin),
            });
        }
    }
    Ok(matching)
}

/// Split a NON node into a REM original and an ADD copy
///
/// The copy takes the original's place and children after the edit, so
/// neither projection changes.
///
/// # Returns
/// The new ADD node
///
/// # Errors
/// * `UnexpectedDiffType` - If `node` is not NON
/// * `OrphanOrCycle` - If `node` has no parent after the edit
pub fn split_node(diff: &mut VariationDiff, node: NodeId) -> Result<NodeId> {
    require(diff, node, DiffType::Non)?;
    let parent = diff
        .parent(node, Time::After)?
        .ok_or(VariationDiffError::OrphanOrCycle { node })?;
    let index = diff
        .index_of_child(parent, node, Time::After)?
        .ok_or(VariationDiffError::InconsistentEdge {
            parent,
            child: node,
            time: Time::After,
        })?;

    let clone = shallow_copy(diff, node)?;
    {
        let copy = diff.node_mut(clone)?;
        copy.diff_type = DiffType::Add;
        copy.set_closing(Time::Before, None);
    }

    let children = remove_children(diff, node, Time::After)?;
    add_children(diff, clone, &children, Time::After)?;
    drop_at(diff, node, Time::After)?;
    {
        let original = diff.node_mut(node)?;
        original.diff_type = DiffType::Rem;
        original.set_closing(Time::After, None);
    }
    insert_child(diff, parent, clone, index, Time::After)?;

    check_node(diff, node)?;
    check_node(diff, clone)?;
    Ok(clone)
}

/// Merge an ADD node into a REM node, making it NON
///
/// `before` takes the place, children and closing line of `after` after
/// the edit; `after` is left detached.
///
/// # Errors
/// * `UnexpectedDiffType` - If `before` is not REM or `after` is not ADD
/// * `OrphanOrCycle` - If `after` has no parent after the edit
pub fn join_node(diff: &mut VariationDiff, before: NodeId, after: NodeId) -> Result<()> {
    require(diff, before, DiffType::Rem)?;
    require(diff, after, DiffType::Add)?;
    let parent = diff
        .parent(after, Time::After)?
        .ok_or(VariationDiffError::OrphanOrCycle { node: after })?;
    let index = diff
        .index_of_child(parent, after, Time::After)?
        .ok_or(VariationDiffError::InconsistentEdge {
            parent,
            child: after,
            time: Time::After,
        })?;

    let children = remove_children(diff, after, Time::After)?;
    drop_at(diff, after, Time::After)?;
    let closing = diff.node_mut(after)?.closing[Time::After.index()].take();
    {
        let joined = diff.node_mut(before)?;
        joined.diff_type = DiffType::Non;
        joined.set_closing(Time::After, closing);
    }
    add_children(diff, before, &children, Time::After)?;
    insert_child(diff, parent, before, index, Time::After)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::GreedyMatcher;
    use crate::ops::copy_ops::deep_copy;
    use crate::parse::{parse_diff, ParseOptions};
    use crate::rules::equality::is_same_as;
    use crate::traversal::compute_size;

    fn parse(text: &str) -> VariationDiff {
        parse_diff(text, ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_split_keeps_projections() {
        let mut diff = parse(" #if A\n  x\n #endif\n y\n");
        let if_node = diff.children(diff.root(), Time::Before).unwrap()[0];

        let clone = split_node(&mut diff, if_node).unwrap();

        assert!(diff.node(if_node).unwrap().is_rem());
        assert!(diff.node(clone).unwrap().is_add());
        assert_eq!(diff.children(diff.root(), Time::After).unwrap()[0], clone);
        let x = diff.children(clone, Time::After).unwrap()[0];
        assert_eq!(diff.parent(x, Time::Before).unwrap(), Some(if_node));
        assert!(diff.node(clone).unwrap().closing(Time::After).is_some());
        assert!(diff.node(if_node).unwrap().closing(Time::After).is_none());
        assert_consistency(&diff).unwrap();
    }

    #[test]
    fn test_split_requires_non() {
        let mut diff = parse("-a\n");
        let removed = diff.children(diff.root(), Time::Before).unwrap()[0];

        assert!(matches!(
            split_node(&mut diff, removed),
            Err(VariationDiffError::UnexpectedDiffType { .. })
        ));
    }

    #[test]
    fn test_join_requires_rem_and_add() {
        let mut diff = parse(" a\n b\n");
        let children = diff.children(diff.root(), Time::Before).unwrap().to_vec();

        assert!(join_node(&mut diff, children[0], children[1]).is_err());
    }

    #[test]
    fn test_refinement_undoes_split() {
        let original = parse(" #if A\n  x\n #endif\n y\n");
        let mut diff = deep_copy(&original).unwrap();
        let if_node = diff.children(diff.root(), Time::Before).unwrap()[0];
        split_node(&mut diff, if_node).unwrap();

        improve_matching(&mut diff, &GreedyMatcher).unwrap();

        assert!(is_same_as(&original, &diff).unwrap());
    }

    #[test]
    fn test_refinement_joins_identical_replacement() {
        let mut diff = parse("-a\n+a\n");

        improve_matching(&mut diff, &GreedyMatcher).unwrap();

        assert_eq!(compute_size(&diff).unwrap(), 2);
        let child = diff.children(diff.root(), Time::After).unwrap()[0];
        assert!(diff.node(child).unwrap().is_non());
    }

    struct Rootless;

    impl Matcher for Rootless {
        fn match_trees(&self, _src: &MatchTree, _dst: &MatchTree, _seed: Matching) -> Result<Matching> {
            Ok(Matching::new())
        }
    }

    #[test]
    fn test_failed_refinement_leaves_diff_untouched() {
        let mut diff = parse("-a\n+a\n");
        let snapshot = diff.clone();

        assert!(improve_matching(&mut diff, &Rootless).is_err());
        assert_eq!(diff, snapshot);
    }
}
