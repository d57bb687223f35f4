use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{Result, VariationDiffError};
use crate::model::{DiffLineNumber, DiffType, NodeType, StableId, Time, VariationDiff};
use crate::traversal::preorder;
use crate::unparse::unparse_diff;

/// One node of a [`DiffDocument`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub stable_id: StableId,
    pub index: usize,
    pub diff_type: DiffType,
    pub node_type: NodeType,
    pub from: DiffLineNumber,
    pub to: DiffLineNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    pub label: Vec<String>,
    pub parent_before: Option<usize>,
    pub parent_after: Option<usize>,
    pub children_before: Vec<usize>,
    pub children_after: Vec<usize>,
}

/// Serializable snapshot of a whole diff
///
/// Edges are arena indices so the document can be read without the
/// library; `nodes` is in preorder with the root first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffDocument {
    pub source: String,
    /// SHA-256 of the unparsed diff text, hex encoded
    pub content_digest: String,
    pub nodes: Vec<NodeRecord>,
}

impl DiffDocument {
    /// Collect the reachable nodes of `diff`
    ///
    /// # Errors
    /// * `UnknownNode` - If an edge points outside the arena
    /// * `OrphanOrCycle` - If the child edges loop
    pub fn from_diff(diff: &VariationDiff) -> Result<Self> {
        let mut nodes = Vec::new();
        for id in preorder(diff)? {
            let node = diff.node(id)?;
            let indices = |time: Time| node.children(time).iter().map(|c| c.index()).collect();
            nodes.push(NodeRecord {
                stable_id: node.stable_id(),
                index: id.index(),
                diff_type: node.diff_type(),
                node_type: node.node_type(),
                from: node.from,
                to: node.to,
                formula: node.formula().map(ToString::to_string),
                label: node.label().lines().to_vec(),
                parent_before: node.parent(Time::Before).map(|p| p.index()),
                parent_after: node.parent(Time::After).map(|p| p.index()),
                children_before: indices(Time::Before),
                children_after: indices(Time::After),
            });
        }
        Ok(Self {
            source: diff.source().to_string(),
            content_digest: content_digest(&unparse_diff(diff)?),
            nodes,
        })
    }
}

fn content_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Render a diff as pretty-printed JSON
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
/// * `Serialization` - If serialization fails
pub fn render_json(diff: &VariationDiff) -> Result<String> {
    let document = DiffDocument::from_diff(diff)?;
    serde_json::to_string_pretty(&document).map_err(|e| VariationDiffError::Serialization {
        message: format!("failed to serialize diff: {}", e),
    })
}
