use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a node in a variation tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    If,
    Else,
    Elif,
    Endif,
    Artifact,
    Root,
}

impl NodeType {
    /// Number of bits needed to pack an ordinal
    pub const REQUIRED_BIT_COUNT: u32 = 3;

    pub const ALL: [NodeType; 6] = [
        NodeType::If,
        NodeType::Else,
        NodeType::Elif,
        NodeType::Endif,
        NodeType::Artifact,
        NodeType::Root,
    ];

    pub fn ordinal(self) -> u64 {
        match self {
            NodeType::If => 0,
            NodeType::Else => 1,
            NodeType::Elif => 2,
            NodeType::Endif => 3,
            NodeType::Artifact => 4,
            NodeType::Root => 5,
        }
    }

    pub fn from_ordinal(ordinal: u64) -> Option<NodeType> {
        NodeType::ALL.into_iter().find(|n| n.ordinal() == ordinal)
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::If => "if",
            NodeType::Else => "else",
            NodeType::Elif => "elif",
            NodeType::Endif => "endif",
            NodeType::Artifact => "artifact",
            NodeType::Root => "root",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<NodeType> {
        NodeType::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(name))
    }

    /// IF and ELIF carry a formula
    pub fn is_conditional_annotation(self) -> bool {
        matches!(self, NodeType::If | NodeType::Elif)
    }

    pub fn is_annotation(self) -> bool {
        matches!(
            self,
            NodeType::If | NodeType::Elif | NodeType::Else | NodeType::Endif
        )
    }

    pub fn is_artifact(self) -> bool {
        self == NodeType::Artifact
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_classification() {
        assert!(NodeType::If.is_conditional_annotation());
        assert!(NodeType::Elif.is_conditional_annotation());
        assert!(!NodeType::Else.is_conditional_annotation());
        assert!(NodeType::Else.is_annotation());
        assert!(NodeType::Endif.is_annotation());
        assert!(!NodeType::Artifact.is_annotation());
        assert!(!NodeType::Root.is_annotation());
    }

    #[test]
    fn test_ordinals_fit_bit_count() {
        for n in NodeType::ALL {
            assert!(n.ordinal() < (1 << NodeType::REQUIRED_BIT_COUNT));
            assert_eq!(NodeType::from_ordinal(n.ordinal()), Some(n));
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(NodeType::from_name("ELIF"), Some(NodeType::Elif));
        assert_eq!(NodeType::from_name("ifdef"), None);
    }
}
