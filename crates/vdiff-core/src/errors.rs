use thiserror::Error;

use crate::model::{DiffLineNumber, DiffType, NodeId, NodeType, Time};

/// Result type alias using VariationDiffError
pub type Result<T> = std::result::Result<T, VariationDiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every error raised by the core. Each kind maps to
/// a stable error code used by logs, the CLI and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdErrorKind {
    // Graph edits
    ChildNotAtTime,
    AlreadyHasParent,
    NotAChild,
    IndexOutOfBounds,
    UnknownNode,
    CannotRemoveRoot,

    // Consistency
    InvariantViolation,
    FormulaMismatch,
    CycleDetected,
    NotAVariationTree,

    // Parsing
    Parse,

    // Matching
    MatchingContract,

    // Transformation
    TransformerDependency,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl VdErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            VdErrorKind::ChildNotAtTime => "ERR_CHILD_NOT_AT_TIME",
            VdErrorKind::AlreadyHasParent => "ERR_ALREADY_HAS_PARENT",
            VdErrorKind::NotAChild => "ERR_NOT_A_CHILD",
            VdErrorKind::IndexOutOfBounds => "ERR_INDEX_OUT_OF_BOUNDS",
            VdErrorKind::UnknownNode => "ERR_UNKNOWN_NODE",
            VdErrorKind::CannotRemoveRoot => "ERR_CANNOT_REMOVE_ROOT",
            VdErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            VdErrorKind::FormulaMismatch => "ERR_FORMULA_MISMATCH",
            VdErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            VdErrorKind::NotAVariationTree => "ERR_NOT_A_VARIATION_TREE",
            VdErrorKind::Parse => "ERR_PARSE",
            VdErrorKind::MatchingContract => "ERR_MATCHING_CONTRACT",
            VdErrorKind::TransformerDependency => "ERR_TRANSFORMER_DEPENDENCY",
            VdErrorKind::Io => "ERR_IO",
            VdErrorKind::Serialization => "ERR_SERIALIZATION",
            VdErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether errors of this kind indicate a bug rather than bad input
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            VdErrorKind::Parse | VdErrorKind::Io | VdErrorKind::Serialization
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification of a [`VariationDiffError`] together with the
/// context needed to log it: the failing operation, the node involved and
/// the diff line where a parse failure was detected.
#[derive(Debug, Clone)]
pub struct VdError {
    kind: VdErrorKind,
    op: Option<String>,
    node_id: Option<String>,
    line: Option<i32>,
    message: String,
}

impl VdError {
    /// Create a new error with the specified kind
    pub fn new(kind: VdErrorKind) -> Self {
        Self {
            kind,
            op: None,
            node_id: None,
            line: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add node context
    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Add diff line context
    pub fn with_line(mut self, line: i32) -> Self {
        self.line = Some(line);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> VdErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the node context, if any
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Get the diff line context, if any
    pub fn line(&self) -> Option<i32> {
        self.line
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for VdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(node_id) = &self.node_id {
            write!(f, " (node: {})", node_id)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {})", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for VdError {}

// ========== End Error Facility ==========

/// Reason a diff could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A line does not start with `+`, `-` or a space
    #[error("invalid diff line")]
    InvalidDiff,

    /// The last line ends with a continuation or an open comment
    #[error("line continuation but no more lines")]
    InvalidLineContinuation,

    /// An `#if` was never closed
    #[error("not all annotations closed")]
    NotAllAnnotationsClosed,

    /// An `#endif` closes nothing
    #[error("#endif without #if")]
    EndifWithoutIf,

    /// An `#else` or `#elif` outside of any `#if`
    #[error("#else or #elif without #if")]
    ElseOrElifWithoutIf,

    /// An `#else` or `#elif` following an `#else`
    #[error("#else after #else")]
    ElseAfterElse,

    /// A conditional macro without an expression
    #[error("conditional macro without expression")]
    IfWithoutCondition,

    /// The condition of a conditional macro is malformed
    #[error("unparseable formula: {reason}")]
    UnparseableFormula { reason: String },

    /// The macro keyword is not a conditional one
    #[error("invalid macro name: {name}")]
    InvalidMacroName { name: String },
}

/// A parse failure with the diff position it was detected at
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: DiffLineNumber,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: DiffLineNumber) -> Self {
        Self { kind, line }
    }
}

/// Comprehensive error taxonomy for variation diff operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariationDiffError {
    // ===== Graph Edit Errors =====
    /// The child does not exist at the time it is attached at
    #[error("Node {child} ({diff_type}) does not exist {time}")]
    ChildNotAtTime {
        child: NodeId,
        diff_type: DiffType,
        time: Time,
    },

    /// The child already has a parent at that time
    #[error("Node {child} already has a parent {time} the edit ({parent})")]
    ChildAlreadyHasParent {
        child: NodeId,
        parent: NodeId,
        time: Time,
    },

    /// The node is not a child of the given parent at that time
    #[error("Node {child} is not a child of {parent} {time} the edit")]
    NotAChild {
        child: NodeId,
        parent: NodeId,
        time: Time,
    },

    /// Insertion index past the end of the child list
    #[error("Index {index} out of bounds for {len} children of {parent}")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    /// Handle does not belong to this diff
    #[error("Unknown node: {node}")]
    UnknownNode { node: NodeId },

    /// The root cannot be removed
    #[error("The root node cannot be removed")]
    CannotRemoveRoot,

    // ===== Consistency Errors =====
    /// Only IF and ELIF nodes carry a formula
    #[error("Node {node} of type {node_type} violates the formula law")]
    FormulaMismatch { node: NodeId, node_type: NodeType },

    /// A parent and child disagree about an edge
    #[error("Inconsistent {time} edge between {parent} and {child}")]
    InconsistentEdge {
        parent: NodeId,
        child: NodeId,
        time: Time,
    },

    /// The set parents do not match the diff type
    #[error("Node {node} ({diff_type}) has an invalid parent configuration: {reason}")]
    InvalidParentArity {
        node: NodeId,
        diff_type: DiffType,
        reason: String,
    },

    /// An ELSE/ELIF hangs below something other than IF/ELIF
    #[error("{node_type} node {node} has a {parent_type} parent {time} the edit")]
    InvalidBranchParent {
        node: NodeId,
        node_type: NodeType,
        parent_type: NodeType,
        time: Time,
    },

    /// Not all ancestors of a node are descendants of the root
    #[error("Not all ancestors of {node} are descendants of the root")]
    OrphanOrCycle { node: NodeId },

    /// A refinement step found a node in an unexpected state
    #[error("Node {node} is {actual} but {expected} was required")]
    UnexpectedDiffType {
        node: NodeId,
        expected: DiffType,
        actual: DiffType,
    },

    /// A variation tree was expected but the graph has edits
    #[error("Not a variation tree: {reason}")]
    NotAVariationTree { reason: String },

    // ===== Parse Errors =====
    /// The diff text is malformed
    #[error("Parse error: {0}")]
    Parse(ParseError),

    // ===== Matching Errors =====
    /// The matcher returned a mapping that breaks its contract
    #[error("Matching contract violation: {reason}")]
    MatchingContractViolation { reason: String },

    // ===== Transformation Errors =====
    /// A transformer was scheduled before a transformer it builds on
    #[error("Transformer {transformer} requires {requires} to run first")]
    UnmetTransformerDependency {
        transformer: String,
        requires: String,
    },

    // ===== Generic Errors =====
    /// I/O failure outside of parsing
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ParseError> for VariationDiffError {
    fn from(err: ParseError) -> Self {
        VariationDiffError::Parse(err)
    }
}

impl From<VariationDiffError> for VdError {
    fn from(err: VariationDiffError) -> Self {
        match err {
            VariationDiffError::ChildNotAtTime {
                child,
                diff_type,
                time,
            } => VdError::new(VdErrorKind::ChildNotAtTime)
                .with_node_id(child.to_string())
                .with_message(format!("{} node does not exist {}", diff_type, time)),

            VariationDiffError::ChildAlreadyHasParent {
                child,
                parent,
                time,
            } => VdError::new(VdErrorKind::AlreadyHasParent)
                .with_node_id(child.to_string())
                .with_message(format!("already a child of {} {}", parent, time)),

            VariationDiffError::NotAChild {
                child,
                parent,
                time,
            } => VdError::new(VdErrorKind::NotAChild)
                .with_node_id(child.to_string())
                .with_message(format!("not a child of {} {}", parent, time)),

            VariationDiffError::IndexOutOfBounds { parent, index, len } => {
                VdError::new(VdErrorKind::IndexOutOfBounds)
                    .with_node_id(parent.to_string())
                    .with_message(format!("index {} for {} children", index, len))
            }

            VariationDiffError::UnknownNode { node } => {
                VdError::new(VdErrorKind::UnknownNode).with_node_id(node.to_string())
            }

            VariationDiffError::CannotRemoveRoot => VdError::new(VdErrorKind::CannotRemoveRoot)
                .with_message("The root node cannot be removed"),

            VariationDiffError::FormulaMismatch { node, node_type } => {
                VdError::new(VdErrorKind::FormulaMismatch)
                    .with_node_id(node.to_string())
                    .with_message(format!("{} node violates the formula law", node_type))
            }

            VariationDiffError::InconsistentEdge {
                parent,
                child,
                time,
            } => VdError::new(VdErrorKind::InvariantViolation)
                .with_node_id(child.to_string())
                .with_message(format!("inconsistent {} edge to parent {}", time, parent)),

            VariationDiffError::InvalidParentArity {
                node,
                diff_type,
                reason,
            } => VdError::new(VdErrorKind::InvariantViolation)
                .with_node_id(node.to_string())
                .with_message(format!("{} node: {}", diff_type, reason)),

            VariationDiffError::InvalidBranchParent {
                node,
                node_type,
                parent_type,
                time,
            } => VdError::new(VdErrorKind::InvariantViolation)
                .with_node_id(node.to_string())
                .with_message(format!(
                    "{} below {} {} the edit",
                    node_type, parent_type, time
                )),

            VariationDiffError::OrphanOrCycle { node } => VdError::new(VdErrorKind::CycleDetected)
                .with_node_id(node.to_string())
                .with_message("Not all ancestors are descendants of the root"),

            VariationDiffError::UnexpectedDiffType {
                node,
                expected,
                actual,
            } => VdError::new(VdErrorKind::InvariantViolation)
                .with_node_id(node.to_string())
                .with_message(format!("expected {} but found {}", expected, actual)),

            VariationDiffError::NotAVariationTree { reason } => {
                VdError::new(VdErrorKind::NotAVariationTree).with_message(reason)
            }

            VariationDiffError::Parse(parse_error) => VdError::new(VdErrorKind::Parse)
                .with_line(parse_error.line.in_diff)
                .with_message(parse_error.kind.to_string()),

            VariationDiffError::MatchingContractViolation { reason } => {
                VdError::new(VdErrorKind::MatchingContract).with_message(reason)
            }

            VariationDiffError::UnmetTransformerDependency {
                transformer,
                requires,
            } => VdError::new(VdErrorKind::TransformerDependency)
                .with_message(format!("{} requires {} to run first", transformer, requires)),

            VariationDiffError::Io { message } => {
                VdError::new(VdErrorKind::Io).with_message(message)
            }

            VariationDiffError::Serialization { message } => {
                VdError::new(VdErrorKind::Serialization).with_message(message)
            }

            VariationDiffError::Internal { message } => {
                VdError::new(VdErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to VariationDiffError
impl From<serde_json::Error> for VariationDiffError {
    fn from(err: serde_json::Error) -> Self {
        VariationDiffError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from std::io::Error to VariationDiffError
impl From<std::io::Error> for VariationDiffError {
    fn from(err: std::io::Error) -> Self {
        VariationDiffError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_is_not_fatal() {
        assert!(!VdErrorKind::Parse.is_fatal());
        assert!(VdErrorKind::InvariantViolation.is_fatal());
        assert!(VdErrorKind::MatchingContract.is_fatal());
    }

    #[test]
    fn test_parse_error_carries_line() {
        let err: VariationDiffError = ParseError::new(
            ParseErrorKind::EndifWithoutIf,
            DiffLineNumber::new(7, 6, 6),
        )
        .into();

        let vd: VdError = err.into();
        assert_eq!(vd.kind(), VdErrorKind::Parse);
        assert_eq!(vd.line(), Some(7));
        assert_eq!(vd.code(), "ERR_PARSE");
    }

    #[test]
    fn test_display_includes_code_op_and_node() {
        let err = VdError::new(VdErrorKind::NotAChild)
            .with_op("remove_child")
            .with_node_id("#3")
            .with_message("not a child");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_NOT_A_CHILD]"));
        assert!(text.contains("remove_child"));
        assert!(text.contains("#3"));
    }
}
