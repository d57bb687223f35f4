//! Conversion of core errors into the structured error facility

use vdiff_core::errors::{ParseError, ParseErrorKind, VariationDiffError, VdError, VdErrorKind};
use vdiff_core::model::{DiffLineNumber, DiffType, NodeId, Time};
use vdiff_core::{parse_diff, ParseOptions, VariationDiff};

fn some_node() -> NodeId {
    VariationDiff::default().root()
}

#[test]
fn test_error_parse_failure_carries_line() {
    // GIVEN a parse error raised on diff line 3
    let err: VariationDiffError =
        ParseError::new(ParseErrorKind::EndifWithoutIf, DiffLineNumber::new(3, 3, 3)).into();

    // WHEN converted
    let vd: VdError = err.into();

    // THEN the kind, code and line are kept
    assert_eq!(vd.kind(), VdErrorKind::Parse);
    assert_eq!(vd.code(), "ERR_PARSE");
    assert_eq!(vd.line(), Some(3));
    assert!(vd.message().contains("#endif without #if"));
    assert!(!vd.kind().is_fatal());
}

#[test]
fn test_error_parse_failure_from_parser() {
    // GIVEN an unclosed annotation WHEN parsed
    let err = parse_diff(" #if A\n", ParseOptions::default()).unwrap_err();

    // THEN the structured error points at the IF
    let vd: VdError = err.into();
    assert_eq!(vd.line(), Some(1));
    assert!(vd.to_string().starts_with("[ERR_PARSE]"));
}

#[test]
fn test_error_cycle_maps_to_cycle_kind() {
    let vd: VdError = VariationDiffError::OrphanOrCycle {
        node: some_node(),
    }
    .into();

    assert_eq!(vd.kind(), VdErrorKind::CycleDetected);
    assert_eq!(vd.code(), "ERR_CYCLE_DETECTED");
    assert!(vd.node_id().is_some());
    assert!(vd.kind().is_fatal());
}

#[test]
fn test_error_invariant_variants_share_kind() {
    let errors = vec![
        VariationDiffError::InconsistentEdge {
            parent: some_node(),
            child: some_node(),
            time: Time::Before,
        },
        VariationDiffError::UnexpectedDiffType {
            node: some_node(),
            expected: DiffType::Non,
            actual: DiffType::Add,
        },
        VariationDiffError::InvalidParentArity {
            node: some_node(),
            diff_type: DiffType::Add,
            reason: "expected only a parent after the edit".to_string(),
        },
    ];

    for err in errors {
        let vd: VdError = err.into();
        assert_eq!(vd.kind(), VdErrorKind::InvariantViolation);
        assert_eq!(vd.code(), "ERR_INVARIANT_VIOLATION");
    }
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (VdErrorKind::ChildNotAtTime, "ERR_CHILD_NOT_AT_TIME"),
        (VdErrorKind::AlreadyHasParent, "ERR_ALREADY_HAS_PARENT"),
        (VdErrorKind::CannotRemoveRoot, "ERR_CANNOT_REMOVE_ROOT"),
        (VdErrorKind::MatchingContract, "ERR_MATCHING_CONTRACT"),
        (VdErrorKind::TransformerDependency, "ERR_TRANSFORMER_DEPENDENCY"),
        (VdErrorKind::NotAVariationTree, "ERR_NOT_A_VARIATION_TREE"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_error_builder_display() {
    let err = VdError::new(VdErrorKind::MatchingContract)
        .with_op("diff_using_matching")
        .with_message("roots are not matched");

    assert_eq!(err.op(), Some("diff_using_matching"));
    assert_eq!(
        err.to_string(),
        "[ERR_MATCHING_CONTRACT] in operation 'diff_using_matching': roots are not matched"
    );
}
