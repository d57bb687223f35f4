//! Re-matching the changed parts of a diff

mod common;

use common::{child, parse};
use vdiff_core::construction::{extract_matching, join_node, split_node};
use vdiff_core::matching::MatchTree;
use vdiff_core::ops::copy_ops::deep_copy;
use vdiff_core::rules::equality::is_same_as;
use vdiff_core::rules::validation::assert_consistency;
use vdiff_core::traversal::{compute_size, count};
use vdiff_core::{improve_matching, print_source, GreedyMatcher, Time};

#[test]
fn test_refinement_split_then_refine_restores_diff() {
    // GIVEN a parsed diff and a copy with one NON node split
    let original = parse(" a\n #if A\n  x\n #endif\n-b\n");
    let mut diff = deep_copy(&original).unwrap();
    let if_id = child(&diff, diff.root(), Time::Before, 1);
    split_node(&mut diff, if_id).unwrap();
    assert!(!is_same_as(&original, &diff).unwrap());

    // WHEN refined
    improve_matching(&mut diff, &GreedyMatcher).unwrap();

    // THEN the split is undone
    assert!(is_same_as(&original, &diff).unwrap());
}

#[test]
fn test_refinement_joins_moved_code() {
    // GIVEN a line that was removed and re-added elsewhere
    let text = "-x\n a\n+x\n";
    let mut diff = parse(text);

    // WHEN refined
    improve_matching(&mut diff, &GreedyMatcher).unwrap();

    // THEN one NON node with different positions remains
    assert_eq!(count(&diff, |n| n.is_add() || n.is_rem()).unwrap(), 0);
    assert_eq!(compute_size(&diff).unwrap(), 3);
    assert_eq!(print_source(&diff, Time::Before).unwrap(), "x\na\n");
    assert_eq!(print_source(&diff, Time::After).unwrap(), "a\nx\n");
    assert_consistency(&diff).unwrap();
}

#[test]
fn test_refinement_keeps_real_changes() {
    // GIVEN a diff whose removed and added lines differ
    let mut diff = parse(" a\n-b\n+c\n");
    let before = deep_copy(&diff).unwrap();

    // WHEN refined
    improve_matching(&mut diff, &GreedyMatcher).unwrap();

    // THEN nothing changes
    assert!(is_same_as(&before, &diff).unwrap());
}

#[test]
fn test_refinement_split_and_join_are_inverse() {
    // GIVEN an unchanged line
    let original = parse(" a\n b\n");
    let mut diff = deep_copy(&original).unwrap();
    let a = child(&diff, diff.root(), Time::Before, 0);

    // WHEN split and joined again
    let copy = split_node(&mut diff, a).unwrap();
    join_node(&mut diff, a, copy).unwrap();

    // THEN the graph is the original one
    assert!(is_same_as(&original, &diff).unwrap());
    assert_consistency(&diff).unwrap();
}

#[test]
fn test_refinement_extracted_matching_pairs_unchanged_nodes() {
    // GIVEN a diff with two unchanged nodes besides the root
    let diff = parse(" a\n-b\n+c\n d\n");
    let src = MatchTree::from_projection(&diff, Time::Before).unwrap();
    let dst = MatchTree::from_projection(&diff, Time::After).unwrap();

    // WHEN extracting the implicit matching
    let matching = extract_matching(&diff, &src, &dst).unwrap();

    // THEN exactly the NON nodes are paired, each with itself
    assert_eq!(matching.len(), 3);
    for (s, d) in matching.iter() {
        assert_eq!(src.get(s).unwrap().origin, dst.get(d).unwrap().origin);
    }
}
