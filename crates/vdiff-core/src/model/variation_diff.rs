use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff_node::{DiffNode, NodeId};
use super::time::Time;
use crate::errors::{Result, VariationDiffError};

/// Where a diff came from
///
/// Opaque to the core; carried along for callers and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffSource {
    #[default]
    Unknown,
    /// Parsed from text, e.g. a file name
    Text { name: String },
    /// Built by comparing two trees
    Compared {
        before: Box<DiffSource>,
        after: Box<DiffSource>,
    },
    /// Projection of another diff at one time
    Projected { source: Box<DiffSource>, time: Time },
}

impl fmt::Display for DiffSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffSource::Unknown => write!(f, "unknown"),
            DiffSource::Text { name } => write!(f, "{}", name),
            DiffSource::Compared { before, after } => write!(f, "{} -> {}", before, after),
            DiffSource::Projected { source, time } => write!(f, "{} ({})", source, time),
        }
    }
}

/// A variation tree diff
///
/// Owns every node in an arena and exactly one ROOT node. Nodes detached by
/// graph operations stay in the arena but are no longer reachable; all
/// queries in [`crate::traversal`] walk from the root.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationDiff {
    pub(crate) nodes: Vec<DiffNode>,
    root: NodeId,
    source: DiffSource,
}

impl VariationDiff {
    /// Create a diff holding only a root node
    pub fn new(source: DiffSource) -> Self {
        Self {
            nodes: vec![DiffNode::create_root()],
            root: NodeId(0),
            source,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &DiffSource {
        &self.source
    }

    pub fn set_source(&mut self, source: DiffSource) {
        self.source = source;
    }

    /// Number of arena slots, including detached nodes
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Look up a node
    ///
    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn node(&self, id: NodeId) -> Result<&DiffNode> {
        self.nodes
            .get(id.0)
            .ok_or(VariationDiffError::UnknownNode { node: id })
    }

    /// Look up a node for mutation of its payload
    ///
    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut DiffNode> {
        self.nodes
            .get_mut(id.0)
            .ok_or(VariationDiffError::UnknownNode { node: id })
    }

    pub(crate) fn push_node(&mut self, node: DiffNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Parent of `id` at `time`
    ///
    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn parent(&self, id: NodeId, time: Time) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent(time))
    }

    /// Ordered children of `id` at `time`
    ///
    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn children(&self, id: NodeId, time: Time) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children(time))
    }

    /// Children at both times without duplicates, before-children first
    ///
    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn all_children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.node(id)?;
        let mut out: Vec<NodeId> = node.children(Time::Before).to_vec();
        for child in node.children(Time::After) {
            if !out.contains(child) {
                out.push(*child);
            }
        }
        Ok(out)
    }

    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn index_of_child(&self, parent: NodeId, child: NodeId, time: Time) -> Result<Option<usize>> {
        Ok(self
            .node(parent)?
            .children(time)
            .iter()
            .position(|c| *c == child))
    }

    /// Whether `child` is a child of `parent` at `time`
    ///
    /// # Errors
    /// * `UnknownNode` - If `child` was not issued by this diff
    pub fn is_child(&self, parent: NodeId, child: NodeId, time: Time) -> Result<bool> {
        Ok(self.node(child)?.parent(time) == Some(parent))
    }

    /// Whether `child` is a child of `parent` at any time
    ///
    /// # Errors
    /// * `UnknownNode` - If `child` was not issued by this diff
    pub fn is_child_any(&self, parent: NodeId, child: NodeId) -> Result<bool> {
        let node = self.node(child)?;
        Ok(Time::ALL.iter().any(|t| node.parent(*t) == Some(parent)))
    }

    /// # Errors
    /// * `UnknownNode` - If the handle was not issued by this diff
    pub fn is_leaf(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        Ok(Time::ALL.iter().all(|t| node.children(*t).is_empty()))
    }
}

impl Default for VariationDiff {
    fn default() -> Self {
        Self::new(DiffSource::Unknown)
    }
}

impl fmt::Display for VariationDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariationDiff of {}", self.source)
    }
}
