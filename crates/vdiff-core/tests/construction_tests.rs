//! Building diffs from two variation trees

mod common;

use common::{child, child_labels, tree};
use vdiff_core::errors::VariationDiffError;
use vdiff_core::matching::{MatchTree, Matcher, Matching};
use vdiff_core::rules::validation::assert_consistency;
use vdiff_core::traversal::{all_match, compute_size, count};
use vdiff_core::{
    diff_using_matching, print_source, unparse_diff, DiffSource, DiffType, GreedyMatcher, Result,
    Time,
};

#[test]
fn test_construction_identical_trees_are_unchanged() {
    // GIVEN two identical trees
    let before = tree("#if A\n code\n#else\n other\n#endif\ntail\n");
    let after = tree("#if A\n code\n#else\n other\n#endif\ntail\n");

    // WHEN diffed
    let diff = diff_using_matching(&before, &after, &GreedyMatcher).unwrap();

    // THEN every node is unchanged and nothing was added
    assert!(all_match(&diff, |n| n.is_non()).unwrap());
    assert_eq!(
        compute_size(&diff).unwrap(),
        compute_size(before.as_diff()).unwrap()
    );
}

#[test]
fn test_construction_added_line_is_last_child() {
    // GIVEN a tree gaining one line inside its #if
    let before = tree("#if A\n code\n#endif");
    let after = tree("#if A\n code\n code2\n#endif");

    // WHEN diffed
    let diff = diff_using_matching(&before, &after, &GreedyMatcher).unwrap();

    // THEN the IF and the old line stay, and the new line is added last
    let if_id = child(&diff, diff.root(), Time::After, 0);
    assert!(diff.node(if_id).unwrap().is_non());
    assert_eq!(
        child_labels(&diff, if_id, Time::After),
        vec![" code", " code2"]
    );
    let added = diff.node(child(&diff, if_id, Time::After, 1)).unwrap();
    assert_eq!(added.diff_type(), DiffType::Add);
    assert_eq!(child_labels(&diff, if_id, Time::Before), vec![" code"]);
}

#[test]
fn test_construction_projections_match_inputs() {
    // GIVEN trees that differ in annotations and code
    let before_text = "a\n#if A\nb\n#endif\nc\n";
    let after_text = "#if B\nb\n#endif\nc\nd\n";
    let before = tree(before_text);
    let after = tree(after_text);

    // WHEN diffed
    let diff = diff_using_matching(&before, &after, &GreedyMatcher).unwrap();

    // THEN each projection prints its input again
    assert_eq!(print_source(&diff, Time::Before).unwrap(), before_text);
    assert_eq!(print_source(&diff, Time::After).unwrap(), after_text);
    assert_consistency(&diff).unwrap();
}

#[test]
fn test_construction_unparse_lists_changes() {
    // GIVEN a line replaced by another
    let before = tree("keep\nold\n");
    let after = tree("keep\nnew\n");

    // WHEN diffed and unparsed
    let diff = diff_using_matching(&before, &after, &GreedyMatcher).unwrap();
    let text = unparse_diff(&diff).unwrap();

    // THEN the old line is removed and the new one added
    assert_eq!(text, " keep\n-old\n+new\n");
    assert_eq!(count(&diff, |n| n.is_add()).unwrap(), 1);
    assert_eq!(count(&diff, |n| n.is_rem()).unwrap(), 1);
}

#[test]
fn test_construction_records_both_sources() {
    // GIVEN two trees
    let before = tree("a\n");
    let after = tree("a\n");

    // WHEN diffed
    let diff = diff_using_matching(&before, &after, &GreedyMatcher).unwrap();

    // THEN the diff remembers it was compared
    assert!(matches!(diff.source(), DiffSource::Compared { .. }));
}

struct DropsRoots;

impl Matcher for DropsRoots {
    fn match_trees(&self, _src: &MatchTree, _dst: &MatchTree, _seed: Matching) -> Result<Matching> {
        Ok(Matching::new())
    }
}

#[test]
fn test_construction_rejects_broken_matcher() {
    // GIVEN a matcher that does not pair the roots
    let before = tree("a\n");
    let after = tree("b\n");

    // WHEN diffing THEN the contract violation surfaces
    assert!(matches!(
        diff_using_matching(&before, &after, &DropsRoots),
        Err(VariationDiffError::MatchingContractViolation { .. })
    ));
}
