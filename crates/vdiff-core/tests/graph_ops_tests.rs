//! Graph edits keep both edge directions in sync and reject illegal edges

mod common;

use common::{child, parse};
use vdiff_core::errors::VariationDiffError;
use vdiff_core::model::DiffLineNumber;
use vdiff_core::ops::copy_ops::deep_copy;
use vdiff_core::ops::graph_ops::{add_child, drop_node, insert_child, remove_node};
use vdiff_core::ops::node_ops::create_artifact;
use vdiff_core::rules::equality::is_same_as;
use vdiff_core::rules::validation::{assert_consistency, is_consistent};
use vdiff_core::traversal::{compute_size, node_with_stable_id};
use vdiff_core::{DiffType, Time, VariationDiff};

#[test]
fn test_graph_remove_node_lifts_children() {
    // GIVEN an unchanged #if with two lines
    let mut diff = parse(" #if A\n a\n b\n #endif\n c\n");
    let if_id = child(&diff, diff.root(), Time::Before, 0);

    // WHEN the IF is removed
    remove_node(&mut diff, if_id).unwrap();

    // THEN its children take its place at both times
    for time in Time::ALL {
        let labels: Vec<String> = diff
            .children(diff.root(), time)
            .unwrap()
            .iter()
            .map(|c| diff.node(*c).unwrap().label().to_string())
            .collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }
    assert_consistency(&diff).unwrap();
}

#[test]
fn test_graph_root_cannot_be_removed() {
    // GIVEN any diff
    let mut diff = parse(" a\n");
    let root = diff.root();

    // WHEN removing the root THEN the edit is refused
    assert!(matches!(
        remove_node(&mut diff, root),
        Err(VariationDiffError::CannotRemoveRoot)
    ));
}

#[test]
fn test_graph_second_parent_is_rejected() {
    // GIVEN an unchanged line below the root
    let mut diff = parse(" a\n b\n");
    let a = child(&diff, diff.root(), Time::Before, 0);
    let b = child(&diff, diff.root(), Time::Before, 1);

    // WHEN attaching it below a sibling as well
    let result = add_child(&mut diff, b, a, Time::Before);

    // THEN the edge is refused
    assert!(matches!(
        result,
        Err(VariationDiffError::ChildAlreadyHasParent { .. })
    ));
}

#[test]
fn test_graph_insert_past_end_is_rejected() {
    // GIVEN a fresh added node
    let mut diff = VariationDiff::default();
    let root = diff.root();
    let node = create_artifact(
        &mut diff,
        DiffType::Add,
        DiffLineNumber::new(1, -1, 1),
        DiffLineNumber::new(2, -1, 2),
        vec!["x".to_string()],
    );

    // WHEN inserted at an index past the end
    let result = insert_child(&mut diff, root, node, 1, Time::After);

    // THEN the index is reported
    assert!(matches!(
        result,
        Err(VariationDiffError::IndexOutOfBounds { index: 1, len: 0, .. })
    ));
}

#[test]
fn test_graph_dropped_node_is_unreachable() {
    // GIVEN a diff with a removed line
    let mut diff = parse(" a\n-b\n");
    let removed = child(&diff, diff.root(), Time::Before, 1);
    let id = diff.node(removed).unwrap().stable_id();

    // WHEN the node is dropped
    drop_node(&mut diff, removed).unwrap();

    // THEN no walk finds it
    assert_eq!(compute_size(&diff).unwrap(), 2);
    assert_eq!(node_with_stable_id(&diff, id).unwrap(), None);
    assert!(is_consistent(&diff).is_success());
}

#[test]
fn test_graph_deep_copy_is_equal_and_independent() {
    // GIVEN a parsed diff
    let original = parse(" a\n-#if A\n+#if B\n x\n #endif\n");

    // WHEN deep copied and the copy edited
    let mut copy = deep_copy(&original).unwrap();
    assert!(is_same_as(&original, &copy).unwrap());
    let first = child(&copy, copy.root(), Time::Before, 0);
    drop_node(&mut copy, first).unwrap();

    // THEN the original is untouched
    assert!(!is_same_as(&original, &copy).unwrap());
    assert_eq!(compute_size(&original).unwrap(), 5);
}
