use crate::errors::{Result, VariationDiffError};
use crate::model::{
    DiffLineNumber, DiffNode, DiffType, Formula, Label, NodeId, NodeType, StableId, Time,
    VariationDiff, INVALID_LINE_NUMBER,
};

/// Create a detached ARTIFACT node
///
/// The node is pushed into the arena without any edges; attach it with
/// [`add_below`](super::graph_ops::add_below) or
/// [`add_child`](super::graph_ops::add_child).
pub fn create_artifact(
    diff: &mut VariationDiff,
    diff_type: DiffType,
    from: DiffLineNumber,
    to: DiffLineNumber,
    lines: Vec<String>,
) -> NodeId {
    diff.push_node(DiffNode::new(
        diff_type,
        NodeType::Artifact,
        from,
        to,
        None,
        Label::new(lines),
    ))
}

/// Create a detached node of any non-root type
///
/// # Arguments
/// * `diff` - Diff that will own the node
/// * `diff_type` - Edit classification of the node
/// * `node_type` - Kind of node; must not be ROOT
/// * `from` - First line (inclusive)
/// * `to` - End line (exclusive)
/// * `formula` - Must be present exactly for IF and ELIF
/// * `label` - Source lines of the node
///
/// # Errors
/// * `FormulaMismatch` - If the formula law is violated or `node_type` is ROOT
pub fn add_node(
    diff: &mut VariationDiff,
    diff_type: DiffType,
    node_type: NodeType,
    from: DiffLineNumber,
    to: DiffLineNumber,
    formula: Option<Formula>,
    label: Label,
) -> Result<NodeId> {
    if node_type == NodeType::Root
        || formula.is_some() != node_type.is_conditional_annotation()
    {
        return Err(VariationDiffError::FormulaMismatch {
            node: NodeId(diff.arena_len()),
            node_type,
        });
    }
    Ok(diff.push_node(DiffNode::new(
        diff_type, node_type, from, to, formula, label,
    )))
}

/// Append lines to the label of `node`
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
pub fn add_lines(diff: &mut VariationDiff, node: NodeId, lines: Vec<String>) -> Result<()> {
    diff.node_mut(node)?.label_mut().add_lines(lines);
    Ok(())
}

/// Rebuild a detached skeleton node from its stable identifier
///
/// Only the diff position survives the encoding; the time positions are
/// invalid and conditional annotations get the formula `True`.
///
/// # Errors
/// * `Internal` - If the identifier does not decode to valid types
pub fn node_from_stable_id(diff: &mut VariationDiff, id: StableId, label: &str) -> Result<NodeId> {
    let (from_in_diff, diff_type, node_type) =
        id.decode().ok_or_else(|| VariationDiffError::Internal {
            message: format!("stable id {} does not decode", id),
        })?;
    let formula = node_type.is_conditional_annotation().then_some(Formula::True);
    Ok(diff.push_node(DiffNode::new(
        diff_type,
        node_type,
        DiffLineNumber::new(from_in_diff, INVALID_LINE_NUMBER, INVALID_LINE_NUMBER),
        DiffLineNumber::invalid(),
        formula,
        Label::new(label.lines().map(str::to_string).collect()),
    )))
}

/// Follow the parent of `node` at `time`, failing for detached nodes
fn parent_at(diff: &VariationDiff, node: NodeId, time: Time) -> Result<NodeId> {
    let current = diff.node(node)?;
    if !current.exists_at(time) {
        return Err(VariationDiffError::ChildNotAtTime {
            child: node,
            diff_type: current.diff_type(),
            time,
        });
    }
    current
        .parent(time)
        .ok_or(VariationDiffError::OrphanOrCycle { node })
}

/// Nearest IF at or above `node` at `time`
///
/// # Returns
/// `None` if the walk reaches the root without passing an IF
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
/// * `ChildNotAtTime` - If a node on the path does not exist at `time`
/// * `OrphanOrCycle` - If the path is detached or loops
pub fn if_node(diff: &VariationDiff, node: NodeId, time: Time) -> Result<Option<NodeId>> {
    let mut current = node;
    for _ in 0..=diff.arena_len() {
        let current_node = diff.node(current)?;
        if current_node.is_if() {
            return Ok(Some(current));
        }
        if current_node.is_root() {
            return Ok(None);
        }
        current = parent_at(diff, current, time)?;
    }
    Err(VariationDiffError::OrphanOrCycle { node })
}

/// Number of edges between `node` and the root at `time`
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
/// * `ChildNotAtTime` - If a node on the path does not exist at `time`
/// * `OrphanOrCycle` - If the path is detached or loops
pub fn depth(diff: &VariationDiff, node: NodeId, time: Time) -> Result<usize> {
    let mut current = node;
    for steps in 0..=diff.arena_len() {
        if diff.node(current)?.is_root() {
            return Ok(steps);
        }
        current = parent_at(diff, current, time)?;
    }
    Err(VariationDiffError::OrphanOrCycle { node })
}

/// Whether the root paths of `node` at both times are the same path
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
/// * `OrphanOrCycle` - If the path loops
pub fn before_path_equals_after_path(diff: &VariationDiff, node: NodeId) -> Result<bool> {
    let mut current = node;
    for _ in 0..=diff.arena_len() {
        let current_node = diff.node(current)?;
        let before = current_node.parent(Time::Before);
        if before != current_node.parent(Time::After) {
            return Ok(false);
        }
        match before {
            Some(parent) => current = parent,
            None => return Ok(true),
        }
    }
    Err(VariationDiffError::OrphanOrCycle { node })
}

/// Number of annotations on the root path of `node` that exist only at `time`
///
/// A changed ELIF or ELSE counts once for its whole chain: the walk skips to
/// the parent of the owning IF.
///
/// # Errors
/// * `UnknownNode` - If `node` does not belong to `diff`
/// * `ChildNotAtTime` - If a node on the path does not exist at `time`
/// * `OrphanOrCycle` - If the path is detached or loops, or a branch has no owning IF
pub fn change_amount(diff: &VariationDiff, node: NodeId, time: Time) -> Result<usize> {
    let change_type = DiffType::that_exists_only_at(time);
    let mut amount = 0;
    let mut current = node;

    for _ in 0..=diff.arena_len() {
        let current_node = diff.node(current)?;
        if current_node.is_root() {
            return Ok(amount);
        }

        let changed = current_node.diff_type() == change_type;
        if changed && (current_node.is_elif() || current_node.is_else()) {
            let parent = parent_at(diff, current, time)?;
            let owner = if_node(diff, parent, time)?
                .ok_or(VariationDiffError::OrphanOrCycle { node: current })?;
            amount += 1;
            current = parent_at(diff, owner, time)?;
        } else {
            if changed && current_node.is_if() {
                amount += 1;
            }
            current = parent_at(diff, current, time)?;
        }
    }
    Err(VariationDiffError::OrphanOrCycle { node })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::graph_ops::add_child;

    fn annotation(
        diff: &mut VariationDiff,
        diff_type: DiffType,
        node_type: NodeType,
        name: &str,
    ) -> NodeId {
        let formula = node_type
            .is_conditional_annotation()
            .then(|| Formula::literal(name));
        add_node(
            diff,
            diff_type,
            node_type,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            formula,
            Label::single(format!("#{} {}", node_type.name(), name)),
        )
        .unwrap()
    }

    #[test]
    fn test_add_node_enforces_formula_law() {
        let mut diff = VariationDiff::default();
        let missing = add_node(
            &mut diff,
            DiffType::Add,
            NodeType::If,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            None,
            Label::empty(),
        );
        assert!(matches!(
            missing,
            Err(VariationDiffError::FormulaMismatch { node_type: NodeType::If, .. })
        ));

        let extra = add_node(
            &mut diff,
            DiffType::Add,
            NodeType::Else,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            Some(Formula::True),
            Label::empty(),
        );
        assert!(extra.is_err());
    }

    #[test]
    fn test_node_from_stable_id_rebuilds_skeleton() {
        let mut diff = VariationDiff::default();
        let id = StableId::encode(12, DiffType::Rem, NodeType::Elif);

        let node = node_from_stable_id(&mut diff, id, "#elif B").unwrap();

        let node = diff.node(node).unwrap();
        assert_eq!(node.stable_id(), id);
        assert_eq!(node.formula(), Some(&Formula::True));
        assert_eq!(node.label().lines(), &["#elif B".to_string()]);
    }

    #[test]
    fn test_depth_and_if_node() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let outer = annotation(&mut diff, DiffType::Add, NodeType::If, "A");
        let code = create_artifact(
            &mut diff,
            DiffType::Add,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["x".into()],
        );
        add_child(&mut diff, root, outer, Time::After).unwrap();
        add_child(&mut diff, outer, code, Time::After).unwrap();

        assert_eq!(depth(&diff, code, Time::After).unwrap(), 2);
        assert_eq!(if_node(&diff, code, Time::After).unwrap(), Some(outer));
        assert_eq!(if_node(&diff, outer, Time::After).unwrap(), Some(outer));
        assert!(matches!(
            depth(&diff, code, Time::Before),
            Err(VariationDiffError::ChildNotAtTime { .. })
        ));
    }

    #[test]
    fn test_change_amount_counts_branch_chain_once() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let outer = annotation(&mut diff, DiffType::Add, NodeType::If, "A");
        let elif = annotation(&mut diff, DiffType::Add, NodeType::Elif, "B");
        let inner_else = annotation(&mut diff, DiffType::Add, NodeType::Else, "");
        let code = create_artifact(
            &mut diff,
            DiffType::Add,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["x".into()],
        );
        add_child(&mut diff, root, outer, Time::After).unwrap();
        add_child(&mut diff, outer, elif, Time::After).unwrap();
        add_child(&mut diff, elif, inner_else, Time::After).unwrap();
        add_child(&mut diff, inner_else, code, Time::After).unwrap();

        assert_eq!(change_amount(&diff, code, Time::After).unwrap(), 1);
        assert_eq!(change_amount(&diff, outer, Time::After).unwrap(), 1);
    }

    #[test]
    fn test_before_path_equals_after_path() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let shared = annotation(&mut diff, DiffType::Non, NodeType::If, "A");
        let moved = create_artifact(
            &mut diff,
            DiffType::Non,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["x".into()],
        );
        for time in Time::ALL {
            add_child(&mut diff, root, shared, time).unwrap();
        }
        add_child(&mut diff, shared, moved, Time::Before).unwrap();
        add_child(&mut diff, root, moved, Time::After).unwrap();

        assert!(before_path_equals_after_path(&diff, shared).unwrap());
        assert!(!before_path_equals_after_path(&diff, moved).unwrap());
    }
}
