//! Views of a diff at one time
//!
//! A [`Projection`] is the pair `(node, time)` borrowed from a diff. Two
//! projections of the same node at the same time compare equal, which makes
//! the value itself usable as cache key.

use std::hash::{Hash, Hasher};

use crate::errors::{Result, VariationDiffError};
use crate::model::{
    DiffLineNumber, DiffNode, Formula, Label, LineRange, NodeId, NodeType, Time, VariationDiff,
};
use crate::ops::{graph_ops, node_ops};

fn require_exists(diff: &VariationDiff, node: NodeId, time: Time) -> Result<()> {
    let backing = diff.node(node)?;
    if backing.exists_at(time) {
        Ok(())
    } else {
        Err(VariationDiffError::ChildNotAtTime {
            child: node,
            diff_type: backing.diff_type(),
            time,
        })
    }
}

/// Read-only view of one node as part of the variation tree at `time`
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    diff: &'a VariationDiff,
    node: NodeId,
    time: Time,
    backing: &'a DiffNode,
}

impl<'a> Projection<'a> {
    /// # Errors
    /// * `UnknownNode` - If `node` does not belong to `diff`
    /// * `ChildNotAtTime` - If `node` does not exist at `time`
    pub fn new(diff: &'a VariationDiff, node: NodeId, time: Time) -> Result<Self> {
        require_exists(diff, node, time)?;
        Ok(Self {
            diff,
            node,
            time,
            backing: diff.node(node)?,
        })
    }

    /// Projection of the root
    ///
    /// # Errors
    /// * `UnknownNode` - If the root is missing from the arena
    pub fn root(diff: &'a VariationDiff, time: Time) -> Result<Self> {
        Self::new(diff, diff.root(), time)
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn backing_node(&self) -> &'a DiffNode {
        self.backing
    }

    pub fn node_type(&self) -> NodeType {
        self.backing.node_type()
    }

    pub fn label(&self) -> &'a Label {
        self.backing.label()
    }

    pub fn formula(&self) -> Option<&'a Formula> {
        self.backing.formula()
    }

    /// Lines covered by the node in the source at this time
    pub fn line_range(&self) -> LineRange {
        DiffLineNumber::range_at_time(self.backing.from, self.backing.to, self.time)
    }

    pub fn is_root(&self) -> bool {
        self.backing.is_root()
    }

    /// # Errors
    /// * `UnknownNode` - If the parent edge points outside the arena
    pub fn parent(&self) -> Result<Option<Projection<'a>>> {
        self.backing
            .parent(self.time)
            .map(|p| Projection::new(self.diff, p, self.time))
            .transpose()
    }

    /// # Errors
    /// * `UnknownNode` - If a child edge points outside the arena
    pub fn children(&self) -> Result<Vec<Projection<'a>>> {
        self.backing
            .children(self.time)
            .iter()
            .map(|c| Projection::new(self.diff, *c, self.time))
            .collect()
    }

    /// # Errors
    /// Same as [`node_ops::depth`].
    pub fn depth(&self) -> Result<usize> {
        node_ops::depth(self.diff, self.node, self.time)
    }

    /// Nearest IF at or above this node
    ///
    /// # Errors
    /// Same as [`node_ops::if_node`].
    pub fn if_node(&self) -> Result<Option<Projection<'a>>> {
        node_ops::if_node(self.diff, self.node, self.time)?
            .map(|id| Projection::new(self.diff, id, self.time))
            .transpose()
    }

    fn require_parent(&self) -> Result<Projection<'a>> {
        self.parent()?
            .ok_or(VariationDiffError::OrphanOrCycle { node: self.node })
    }

    fn own_formula(&self) -> Result<Formula> {
        self.formula()
            .cloned()
            .ok_or(VariationDiffError::FormulaMismatch {
                node: self.node,
                node_type: self.node_type(),
            })
    }

    fn branch_error(&self, ancestor: &Projection<'a>) -> VariationDiffError {
        VariationDiffError::InvalidBranchParent {
            node: self.node,
            node_type: self.node_type(),
            parent_type: ancestor.node_type(),
            time: self.time,
        }
    }

    /// Walk from an ELSE/ELIF up to the IF owning its chain
    fn owning_if(&self) -> Result<Projection<'a>> {
        let mut ancestor = self.require_parent()?;
        while !ancestor.backing.is_if() {
            if !ancestor.backing.is_elif() {
                return Err(self.branch_error(&ancestor));
            }
            ancestor = ancestor.require_parent()?;
        }
        Ok(ancestor)
    }

    /// Conjunctive clauses of [`feature_mapping`](Self::feature_mapping)
    ///
    /// # Errors
    /// * `InvalidBranchParent` - If an ELSE/ELIF chain is not owned by an IF
    /// * `OrphanOrCycle` - If a required parent is missing
    /// * `FormulaMismatch` - If an IF/ELIF lacks its formula
    pub fn feature_mapping_clauses(&self) -> Result<Vec<Formula>> {
        match self.node_type() {
            NodeType::Root => Ok(vec![Formula::True]),
            NodeType::Artifact => self.require_parent()?.feature_mapping_clauses(),
            NodeType::If | NodeType::Endif => Ok(vec![self.own_formula()?]),
            NodeType::Elif | NodeType::Else => {
                let mut clauses = Vec::new();
                if self.backing.is_elif() {
                    clauses.push(self.own_formula()?);
                }
                let mut ancestor = self.require_parent()?;
                while !ancestor.backing.is_if() {
                    if !ancestor.backing.is_elif() {
                        return Err(self.branch_error(&ancestor));
                    }
                    clauses.push(ancestor.own_formula()?.negate());
                    ancestor = ancestor.require_parent()?;
                }
                clauses.push(ancestor.own_formula()?.negate());
                Ok(clauses)
            }
        }
    }

    /// Formula under which this node's own annotation selects it
    ///
    /// # Errors
    /// Same as [`feature_mapping_clauses`](Self::feature_mapping_clauses).
    pub fn feature_mapping(&self) -> Result<Formula> {
        Ok(Formula::and_all(self.feature_mapping_clauses()?))
    }

    /// Conjunctive clauses of [`presence_condition`](Self::presence_condition)
    ///
    /// # Errors
    /// Same as [`feature_mapping_clauses`](Self::feature_mapping_clauses).
    pub fn presence_condition_clauses(&self) -> Result<Vec<Formula>> {
        match self.node_type() {
            NodeType::Root => Ok(Vec::new()),
            NodeType::Artifact => self.require_parent()?.presence_condition_clauses(),
            NodeType::Elif | NodeType::Else => {
                let mut clauses = self.feature_mapping_clauses()?;
                if let Some(outer) = self.owning_if()?.parent()? {
                    clauses.extend(outer.presence_condition_clauses()?);
                }
                Ok(clauses)
            }
            NodeType::If | NodeType::Endif => {
                let mut clauses = match self.parent()? {
                    Some(parent) => parent.presence_condition_clauses()?,
                    None => Vec::new(),
                };
                clauses.push(self.feature_mapping()?);
                Ok(clauses)
            }
        }
    }

    /// Formula under which this node is part of the variant at this time
    ///
    /// # Errors
    /// Same as [`feature_mapping_clauses`](Self::feature_mapping_clauses).
    pub fn presence_condition(&self) -> Result<Formula> {
        Ok(Formula::and_all(self.presence_condition_clauses()?))
    }
}

impl PartialEq for Projection<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.diff, other.diff) && self.node == other.node && self.time == other.time
    }
}

impl Eq for Projection<'_> {}

impl Hash for Projection<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
        self.time.hash(state);
    }
}

/// Mutable view of one node at a fixed time
///
/// Edge edits go through [`graph_ops`] with the projection's time.
pub struct ProjectionMut<'a> {
    diff: &'a mut VariationDiff,
    node: NodeId,
    time: Time,
}

impl<'a> ProjectionMut<'a> {
    /// # Errors
    /// * `UnknownNode` - If `node` does not belong to `diff`
    /// * `ChildNotAtTime` - If `node` does not exist at `time`
    pub fn new(diff: &'a mut VariationDiff, node: NodeId, time: Time) -> Result<Self> {
        require_exists(diff, node, time)?;
        Ok(Self { diff, node, time })
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn time(&self) -> Time {
        self.time
    }

    /// Read-only view of the same node
    ///
    /// # Errors
    /// * `UnknownNode` - If the node was removed from the arena
    pub fn as_projection(&self) -> Result<Projection<'_>> {
        Projection::new(self.diff, self.node, self.time)
    }

    /// # Errors
    /// Same as [`graph_ops::add_child`].
    pub fn add_child(&mut self, child: NodeId) -> Result<()> {
        graph_ops::add_child(self.diff, self.node, child, self.time)
    }

    /// # Errors
    /// Same as [`graph_ops::insert_child`].
    pub fn insert_child(&mut self, child: NodeId, index: usize) -> Result<()> {
        graph_ops::insert_child(self.diff, self.node, child, index, self.time)
    }

    /// # Errors
    /// Same as [`graph_ops::remove_child`].
    pub fn remove_child(&mut self, child: NodeId) -> Result<()> {
        graph_ops::remove_child(self.diff, self.node, child, self.time)
    }

    /// # Errors
    /// Same as [`graph_ops::remove_children`].
    pub fn remove_children(&mut self) -> Result<Vec<NodeId>> {
        graph_ops::remove_children(self.diff, self.node, self.time)
    }

    /// Detach the node from its parent at this time
    ///
    /// # Errors
    /// Same as [`graph_ops::drop_at`].
    pub fn drop(&mut self) -> Result<()> {
        graph_ops::drop_at(self.diff, self.node, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiffType;
    use crate::ops::graph_ops::add_child;
    use crate::ops::node_ops::{add_node, create_artifact};

    fn annotation(diff: &mut VariationDiff, node_type: NodeType, name: &str) -> NodeId {
        add_node(
            diff,
            DiffType::Non,
            node_type,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            node_type
                .is_conditional_annotation()
                .then(|| Formula::literal(name)),
            Label::single(name),
        )
        .unwrap()
    }

    fn attach(diff: &mut VariationDiff, parent: NodeId, child: NodeId) {
        for time in Time::ALL {
            add_child(diff, parent, child, time).unwrap();
        }
    }

    #[test]
    fn test_projection_value_equality() {
        let diff = VariationDiff::default();
        let a = Projection::root(&diff, Time::Before).unwrap();
        let b = Projection::root(&diff, Time::Before).unwrap();
        let c = Projection::root(&diff, Time::After).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_projection_requires_existence() {
        let mut diff = VariationDiff::default();
        let added = create_artifact(
            &mut diff,
            DiffType::Add,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["x".into()],
        );
        assert!(matches!(
            Projection::new(&diff, added, Time::Before),
            Err(VariationDiffError::ChildNotAtTime { .. })
        ));
    }

    #[test]
    fn test_feature_mapping_of_branch_chain() {
        // #if A / #elif B / #else / #endif, nested in #if O
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let outer = annotation(&mut diff, NodeType::If, "O");
        let a = annotation(&mut diff, NodeType::If, "A");
        let b = annotation(&mut diff, NodeType::Elif, "B");
        let other = annotation(&mut diff, NodeType::Else, "");
        let code = create_artifact(
            &mut diff,
            DiffType::Non,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["code".into()],
        );
        attach(&mut diff, root, outer);
        attach(&mut diff, outer, a);
        attach(&mut diff, a, b);
        attach(&mut diff, b, other);
        attach(&mut diff, other, code);

        let not_a = Formula::literal("A").negate();
        let not_b = Formula::literal("B").negate();

        let elif = Projection::new(&diff, b, Time::After).unwrap();
        assert_eq!(
            elif.feature_mapping().unwrap(),
            Formula::And(vec![Formula::literal("B"), not_a.clone()])
        );

        let artifact = Projection::new(&diff, code, Time::Before).unwrap();
        assert_eq!(
            artifact.feature_mapping().unwrap(),
            Formula::And(vec![not_b.clone(), not_a.clone()])
        );
        assert_eq!(
            artifact.presence_condition().unwrap(),
            Formula::And(vec![not_b, not_a, Formula::literal("O")])
        );

        let root = Projection::root(&diff, Time::Before).unwrap();
        assert_eq!(root.feature_mapping().unwrap(), Formula::True);
        assert_eq!(root.presence_condition().unwrap(), Formula::True);
    }

    #[test]
    fn test_else_below_artifact_is_an_error() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let code = create_artifact(
            &mut diff,
            DiffType::Non,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["code".into()],
        );
        let other = annotation(&mut diff, NodeType::Else, "");
        attach(&mut diff, root, code);
        attach(&mut diff, code, other);

        let projection = Projection::new(&diff, other, Time::Before).unwrap();
        assert!(matches!(
            projection.feature_mapping(),
            Err(VariationDiffError::InvalidBranchParent { .. })
        ));
    }

    #[test]
    fn test_projection_mut_edits_at_its_time() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let added = create_artifact(
            &mut diff,
            DiffType::Add,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["x".into()],
        );

        let mut after_root = ProjectionMut::new(&mut diff, root, Time::After).unwrap();
        after_root.add_child(added).unwrap();
        assert_eq!(
            after_root.as_projection().unwrap().children().unwrap().len(),
            1
        );
        assert_eq!(after_root.remove_children().unwrap(), vec![added]);

        let mut before_root = ProjectionMut::new(&mut diff, root, Time::Before).unwrap();
        assert!(before_root.add_child(added).is_err());
    }
}
