use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff_type::DiffType;
use super::formula::Formula;
use super::label::Label;
use super::line_number::DiffLineNumber;
use super::node_type::NodeType;
use super::time::Time;

/// Handle of a node inside the arena of one [`VariationDiff`](super::VariationDiff)
///
/// Handles are only meaningful for the diff that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deterministic node identity packed from line number, diff type and node type
///
/// Layout: `(1 + from.in_diff) << 6 | diff_type << 3 | node_type`. Unique
/// within one diff as long as no two nodes start on the same diff line with
/// the same types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StableId(pub u64);

impl StableId {
    const TYPE_BITS: u32 = DiffType::REQUIRED_BIT_COUNT + NodeType::REQUIRED_BIT_COUNT;

    pub fn encode(from_in_diff: i32, diff_type: DiffType, node_type: NodeType) -> Self {
        // Invalid line numbers (-1) map to zero
        let line = u64::try_from(i64::from(from_in_diff) + 1).unwrap_or(0);
        let mut id = line;
        id <<= DiffType::REQUIRED_BIT_COUNT;
        id |= diff_type.ordinal();
        id <<= NodeType::REQUIRED_BIT_COUNT;
        id |= node_type.ordinal();
        StableId(id)
    }

    /// Recover `(from_in_diff, diff_type, node_type)`
    pub fn decode(self) -> Option<(i32, DiffType, NodeType)> {
        let node_mask = (1u64 << NodeType::REQUIRED_BIT_COUNT) - 1;
        let diff_mask = (1u64 << DiffType::REQUIRED_BIT_COUNT) - 1;
        let node_type = NodeType::from_ordinal(self.0 & node_mask)?;
        let diff_type =
            DiffType::from_ordinal((self.0 >> NodeType::REQUIRED_BIT_COUNT) & diff_mask)?;
        let line = i64::try_from(self.0 >> Self::TYPE_BITS).ok()? - 1;
        Some((i32::try_from(line).ok()?, diff_type, node_type))
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `#endif` line that closed an IF chain at one time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingLine {
    pub diff_type: DiffType,
    pub line: DiffLineNumber,
    pub label: Label,
}

/// A node of a variation tree diff
///
/// Each node has one parent slot and one ordered child list per [`Time`].
/// Edges are arena handles. Use the functions in [`crate::ops`] to change
/// them so that both directions stay in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub(crate) diff_type: DiffType,
    pub(crate) node_type: NodeType,
    pub(crate) label: Label,
    pub(crate) formula: Option<Formula>,
    pub from: DiffLineNumber,
    pub to: DiffLineNumber,
    pub(crate) parents: [Option<NodeId>; 2],
    pub(crate) children: [Vec<NodeId>; 2],
    pub(crate) closing: [Option<ClosingLine>; 2],
}

impl DiffNode {
    pub(crate) fn new(
        diff_type: DiffType,
        node_type: NodeType,
        from: DiffLineNumber,
        to: DiffLineNumber,
        formula: Option<Formula>,
        label: Label,
    ) -> Self {
        Self {
            diff_type,
            node_type,
            label,
            formula,
            from,
            to,
            parents: [None, None],
            children: [Vec::new(), Vec::new()],
            closing: [None, None],
        }
    }

    /// The formula-less NON root of a diff
    pub(crate) fn create_root() -> Self {
        Self::new(
            DiffType::Non,
            NodeType::Root,
            DiffLineNumber::new(0, 0, 0),
            DiffLineNumber::invalid(),
            None,
            Label::empty(),
        )
    }

    /// Copy of the payload without any edges
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            diff_type: self.diff_type,
            node_type: self.node_type,
            label: self.label.clone(),
            formula: self.formula.clone(),
            from: self.from,
            to: self.to,
            parents: [None, None],
            children: [Vec::new(), Vec::new()],
            closing: self.closing.clone(),
        }
    }

    pub fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }

    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub fn parent(&self, time: Time) -> Option<NodeId> {
        self.parents[time.index()]
    }

    pub fn children(&self, time: Time) -> &[NodeId] {
        &self.children[time.index()]
    }

    pub fn closing(&self, time: Time) -> Option<&ClosingLine> {
        self.closing[time.index()].as_ref()
    }

    pub fn set_closing(&mut self, time: Time, closing: Option<ClosingLine>) {
        self.closing[time.index()] = closing;
    }

    pub fn stable_id(&self) -> StableId {
        StableId::encode(self.from.in_diff, self.diff_type, self.node_type)
    }

    /// Text used to decide whether two nodes may be matched
    ///
    /// The formula for conditional annotations, the label text otherwise.
    pub fn matching_label(&self) -> String {
        match (&self.formula, self.node_type.is_conditional_annotation()) {
            (Some(formula), true) => formula.to_string(),
            _ => self.label.to_string(),
        }
    }

    pub fn exists_at(&self, time: Time) -> bool {
        self.diff_type.exists_at(time)
    }

    pub fn is_add(&self) -> bool {
        self.diff_type == DiffType::Add
    }

    pub fn is_rem(&self) -> bool {
        self.diff_type == DiffType::Rem
    }

    pub fn is_non(&self) -> bool {
        self.diff_type == DiffType::Non
    }

    pub fn is_if(&self) -> bool {
        self.node_type == NodeType::If
    }

    pub fn is_elif(&self) -> bool {
        self.node_type == NodeType::Elif
    }

    pub fn is_else(&self) -> bool {
        self.node_type == NodeType::Else
    }

    pub fn is_artifact(&self) -> bool {
        self.node_type == NodeType::Artifact
    }

    pub fn is_root(&self) -> bool {
        self.node_type == NodeType::Root
    }

    pub fn is_annotation(&self) -> bool {
        self.node_type.is_annotation()
    }

    pub fn is_conditional_annotation(&self) -> bool {
        self.node_type.is_conditional_annotation()
    }
}

impl fmt::Display for DiffNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{} from line {} to {}",
            self.diff_type, self.node_type, self.from.in_diff, self.to.in_diff
        )?;
        match &self.formula {
            Some(formula) => write!(f, " with formula {}", formula),
            None if self.is_artifact() => write!(f, " with label \"{}\"", self.label),
            None => Ok(()),
        }
    }
}
