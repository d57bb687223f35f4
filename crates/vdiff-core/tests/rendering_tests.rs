//! Listing, JSON and text output of diffs

mod common;

use common::parse;
use vdiff_core::render::{render_json, render_listing, DiffDocument};
use vdiff_core::{print_source, unparse_diff, Time};

#[test]
fn test_render_listing_one_line_per_node() {
    // GIVEN a diff with a changed condition
    let diff = parse("-#if A\n+#if B\n x\n #endif\n");

    // WHEN rendered as listing
    let output = render_listing(&diff).unwrap();

    // THEN the shared body appears once, below the first IF
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("  -IF "));
    assert!(lines[2].starts_with("     ARTIFACT "));
    assert!(lines[3].starts_with("  +IF "));
    assert!(lines[3].ends_with(" B"));
}

#[test]
fn test_render_json_document_matches_diff() {
    // GIVEN a diff with an added line
    let diff = parse(" a\n+b\n");

    // WHEN converted to a document and to JSON
    let document = DiffDocument::from_diff(&diff).unwrap();
    let json = render_json(&diff).unwrap();

    // THEN both agree on the nodes
    assert_eq!(document.nodes.len(), 3);
    assert_eq!(document.nodes[0].children_after, vec![1, 2]);
    assert_eq!(document.nodes[2].parent_before, None);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"][2]["diff_type"], "ADD");
    assert_eq!(value["nodes"][2]["label"][0], "b");
    assert_eq!(value["content_digest"], document.content_digest.as_str());
}

#[test]
fn test_render_unparse_and_print_source() {
    // GIVEN a diff with nested annotations
    let text = " #ifdef A\n-#if B\n+#if C\n  x\n #endif\n+ y\n #endif\n";
    let diff = parse(text);

    // WHEN unparsed and printed per time
    let unparsed = unparse_diff(&diff).unwrap();
    let before = print_source(&diff, Time::Before).unwrap();
    let after = print_source(&diff, Time::After).unwrap();

    // THEN the diff and both files come back
    assert_eq!(unparsed, text);
    assert_eq!(before, "#ifdef A\n#if B\n x\n#endif\n#endif\n");
    assert_eq!(after, "#ifdef A\n#if C\n x\n#endif\n y\n#endif\n");
}
