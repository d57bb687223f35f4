//! Tree matching
//!
//! A [`Matcher`] pairs nodes of two ordered labeled trees. Construction and
//! refinement only depend on the trait; [`GreedyMatcher`] is the bundled
//! implementation.

pub mod greedy;

pub use greedy::GreedyMatcher;

use std::collections::BTreeMap;

use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, NodeType, Time, VariationDiff, VariationTree};

/// One node of a [`MatchTree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchNode {
    pub node_type: NodeType,
    /// Formula text for conditional annotations, label text otherwise
    pub label: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Node of the diff this entry was taken from
    pub origin: NodeId,
}

/// Ordered labeled tree indexed in preorder
///
/// Index `0` is the root. The tree holds handles into the diff it was built
/// from and stays valid as long as that arena does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTree {
    nodes: Vec<MatchNode>,
}

impl MatchTree {
    /// Snapshot of the projection of `diff` at `time`
    ///
    /// # Errors
    /// * `UnknownNode` - If an edge points outside the arena
    /// * `OrphanOrCycle` - If the child edges at `time` loop
    pub fn from_projection(diff: &VariationDiff, time: Time) -> Result<Self> {
        let mut nodes: Vec<MatchNode> = Vec::new();
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(diff.root(), None)];

        while let Some((id, parent)) = stack.pop() {
            if nodes.len() > diff.arena_len() {
                return Err(VariationDiffError::OrphanOrCycle { node: id });
            }
            let node = diff.node(id)?;
            let index = nodes.len();
            nodes.push(MatchNode {
                node_type: node.node_type(),
                label: node.matching_label(),
                parent,
                children: Vec::new(),
                origin: id,
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            stack.extend(
                diff.children(id, time)?
                    .iter()
                    .rev()
                    .map(|child| (*child, Some(index))),
            );
        }
        Ok(Self { nodes })
    }

    /// Snapshot of an unchanged tree
    ///
    /// # Errors
    /// * `UnknownNode` - If an edge points outside the arena
    pub fn from_tree(tree: &VariationTree) -> Result<Self> {
        Self::from_projection(tree.as_diff(), Time::Before)
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MatchNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[MatchNode] {
        &self.nodes
    }

    /// Index of the entry taken from `origin`
    pub fn index_of(&self, origin: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.origin == origin)
    }
}

/// Partial injective map between source and destination indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    src_to_dst: BTreeMap<usize, usize>,
    dst_to_src: BTreeMap<usize, usize>,
}

impl Matching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `src` with `dst`
    ///
    /// # Returns
    /// `false` and no change if either side is already paired with something else
    pub fn add(&mut self, src: usize, dst: usize) -> bool {
        match (self.src_to_dst.get(&src), self.dst_to_src.get(&dst)) {
            (None, None) => {
                self.src_to_dst.insert(src, dst);
                self.dst_to_src.insert(dst, src);
                true
            }
            (Some(d), Some(s)) => *d == dst && *s == src,
            _ => false,
        }
    }

    pub fn dst_for_src(&self, src: usize) -> Option<usize> {
        self.src_to_dst.get(&src).copied()
    }

    pub fn src_for_dst(&self, dst: usize) -> Option<usize> {
        self.dst_to_src.get(&dst).copied()
    }

    pub fn has(&self, src: usize, dst: usize) -> bool {
        self.dst_for_src(src) == Some(dst)
    }

    pub fn is_src_matched(&self, src: usize) -> bool {
        self.src_to_dst.contains_key(&src)
    }

    pub fn is_dst_matched(&self, dst: usize) -> bool {
        self.dst_to_src.contains_key(&dst)
    }

    pub fn len(&self) -> usize {
        self.src_to_dst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src_to_dst.is_empty()
    }

    /// Pairs ordered by source index
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src_to_dst.iter().map(|(s, d)| (*s, *d))
    }

    /// Whether every pair of `seed` is also a pair of `self`
    pub fn extends(&self, seed: &Matching) -> bool {
        seed.iter().all(|(s, d)| self.has(s, d))
    }
}

/// Tree matching oracle
///
/// The returned matching must contain every pair of `seed`, pair the roots
/// and only pair nodes of equal node type.
pub trait Matcher {
    /// # Errors
    /// * `MatchingContractViolation` - If the oracle cannot honour the seed
    fn match_trees(&self, src: &MatchTree, dst: &MatchTree, seed: Matching) -> Result<Matching>;
}

fn contract_violation(reason: String) -> VariationDiffError {
    VariationDiffError::MatchingContractViolation { reason }
}

/// Check a matcher result against the oracle contract
///
/// # Errors
/// * `MatchingContractViolation` - If a pair leaves either tree, the roots are
///   not paired, paired node types differ or the maps disagree
pub fn validate_matching(src: &MatchTree, dst: &MatchTree, matching: &Matching) -> Result<()> {
    if !matching.has(src.root(), dst.root()) {
        return Err(contract_violation("roots are not matched".to_string()));
    }
    for (s, d) in matching.iter() {
        let (Some(src_node), Some(dst_node)) = (src.get(s), dst.get(d)) else {
            return Err(contract_violation(format!(
                "pair ({}, {}) is out of range for trees of size {} and {}",
                s,
                d,
                src.len(),
                dst.len()
            )));
        };
        if src_node.node_type != dst_node.node_type {
            return Err(contract_violation(format!(
                "pair ({}, {}) matches {} with {}",
                s, d, src_node.node_type, dst_node.node_type
            )));
        }
        if matching.src_for_dst(d) != Some(s) {
            return Err(contract_violation(format!(
                "pair ({}, {}) is not injective",
                s, d
            )));
        }
    }
    if matching.src_to_dst.len() != matching.dst_to_src.len() {
        return Err(contract_violation("matching is not injective".to_string()));
    }
    Ok(())
}

/// Run `matcher` and enforce its contract
///
/// # Errors
/// * `MatchingContractViolation` - If the result drops seed pairs or fails [`validate_matching`]
pub fn run_matcher(
    matcher: &dyn Matcher,
    src: &MatchTree,
    dst: &MatchTree,
    seed: Matching,
) -> Result<Matching> {
    let matching = matcher.match_trees(src, dst, seed.clone())?;
    if !matching.extends(&seed) {
        return Err(contract_violation(
            "result does not extend the seed".to_string(),
        ));
    }
    validate_matching(src, dst, &matching)?;
    Ok(matching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_variation_tree, ParseOptions};

    fn tree(text: &str) -> MatchTree {
        let tree = parse_variation_tree(text, ParseOptions::default()).unwrap();
        MatchTree::from_tree(&tree).unwrap()
    }

    #[test]
    fn test_match_tree_is_preorder() {
        let t = tree("#if A\na\n#else\nb\n#endif\nc\n");
        let types: Vec<NodeType> = t.nodes().iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Root,
                NodeType::If,
                NodeType::Artifact,
                NodeType::Else,
                NodeType::Artifact,
                NodeType::Artifact,
            ]
        );
        assert_eq!(t.get(1).unwrap().label, "A");
        assert_eq!(t.get(0).unwrap().children, vec![1, 5]);
        assert_eq!(t.get(4).unwrap().parent, Some(3));
    }

    #[test]
    fn test_matching_is_injective() {
        let mut m = Matching::new();
        assert!(m.add(0, 0));
        assert!(m.add(1, 2));
        assert!(m.add(1, 2));
        assert!(!m.add(1, 3));
        assert!(!m.add(4, 2));
        assert_eq!(m.len(), 2);
        assert_eq!(m.src_for_dst(2), Some(1));
    }

    #[test]
    fn test_validate_rejects_type_mismatch_and_missing_roots() {
        let src = tree("#if A\na\n#endif\n");
        let dst = tree("a\n");

        let mut m = Matching::new();
        assert!(validate_matching(&src, &dst, &m).is_err());

        m.add(0, 0);
        m.add(1, 1);
        assert!(matches!(
            validate_matching(&src, &dst, &m),
            Err(VariationDiffError::MatchingContractViolation { .. })
        ));

        let mut out_of_range = Matching::new();
        out_of_range.add(0, 0);
        out_of_range.add(2, 9);
        assert!(validate_matching(&src, &dst, &out_of_range).is_err());
    }

    struct Forgetful;

    impl Matcher for Forgetful {
        fn match_trees(&self, src: &MatchTree, dst: &MatchTree, _seed: Matching) -> Result<Matching> {
            let mut m = Matching::new();
            m.add(src.root(), dst.root());
            Ok(m)
        }
    }

    #[test]
    fn test_run_matcher_requires_seed_extension() {
        let src = tree("a\n");
        let dst = tree("a\n");
        let mut seed = Matching::new();
        seed.add(1, 1);

        let result = run_matcher(&Forgetful, &src, &dst, seed);

        assert!(matches!(
            result,
            Err(VariationDiffError::MatchingContractViolation { .. })
        ));
    }
}
