use crate::errors::{Result, VariationDiffError};
use crate::model::{DiffType, NodeId, Time, VariationDiff};

/// Check every node-local invariant of `node`
///
/// Covers edge symmetry, parent arity for the diff type, parent existence,
/// the IF/ELIF parent rule for branches and the formula law. Reachability
/// from the root is checked by
/// [`assert_consistency`](super::validation::assert_consistency).
///
/// # Errors
/// * `UnknownNode` - If `node` or a neighbour does not belong to `diff`
/// * `InconsistentEdge` - If parent and child disagree about an edge
/// * `InvalidParentArity` - If the set parents do not fit the diff type
/// * `InvalidBranchParent` - If an ELSE/ELIF is not below an IF/ELIF
/// * `FormulaMismatch` - If the formula presence does not fit the node type
pub fn check_node(diff: &VariationDiff, node: NodeId) -> Result<()> {
    let current = diff.node(node)?;

    for time in Time::ALL {
        for child in current.children(time) {
            if diff.node(*child)?.parent(time) != Some(node) {
                return Err(VariationDiffError::InconsistentEdge {
                    parent: node,
                    child: *child,
                    time,
                });
            }
        }
        if let Some(parent) = current.parent(time) {
            if !diff.node(parent)?.children(time).contains(&node) {
                return Err(VariationDiffError::InconsistentEdge {
                    parent,
                    child: node,
                    time,
                });
            }
        }
    }

    let arity = |reason: &str| VariationDiffError::InvalidParentArity {
        node,
        diff_type: current.diff_type(),
        reason: reason.to_string(),
    };

    let before = current.parent(Time::Before);
    let after = current.parent(Time::After);
    if current.is_root() {
        if before.is_some() || after.is_some() {
            return Err(arity("the root has a parent"));
        }
    } else {
        match (current.diff_type(), before, after) {
            (DiffType::Add, None, Some(_)) | (DiffType::Rem, Some(_), None) => {}
            (DiffType::Non, Some(b), Some(a)) => {
                if b == a && !diff.node(b)?.is_non() {
                    return Err(arity("a shared parent must be unchanged"));
                }
            }
            (DiffType::Add, _, _) => return Err(arity("expected only a parent after the edit")),
            (DiffType::Rem, _, _) => return Err(arity("expected only a parent before the edit")),
            (DiffType::Non, _, _) => return Err(arity("expected a parent at both times")),
        }
    }

    for time in Time::ALL {
        let Some(parent) = current.parent(time) else {
            continue;
        };
        let parent_node = diff.node(parent)?;
        if !parent_node.exists_at(time) {
            return Err(arity(&format!("parent {} does not exist {} the edit", parent, time)));
        }
        if (current.is_else() || current.is_elif())
            && !(parent_node.is_if() || parent_node.is_elif())
        {
            return Err(VariationDiffError::InvalidBranchParent {
                node,
                node_type: current.node_type(),
                parent_type: parent_node.node_type(),
                time,
            });
        }
    }

    if current.formula().is_some() != current.is_conditional_annotation() {
        return Err(VariationDiffError::FormulaMismatch {
            node,
            node_type: current.node_type(),
        });
    }

    Ok(())
}

/// Find nodes whose parent chain at some time loops
///
/// Walks the parent pointers of every given node with a three-colour mark
/// per time, so each node is walked once per time.
///
/// Returns list of (node, time) tuples, one per detected loop entry
pub fn find_parent_cycles(diff: &VariationDiff, nodes: &[NodeId]) -> Vec<(NodeId, Time)> {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut cycles = Vec::new();
    for time in Time::ALL {
        let mut mark = vec![UNSEEN; diff.arena_len()];
        for start in nodes {
            let mut path = Vec::new();
            let mut current = Some(*start);
            while let Some(id) = current {
                match mark.get(id.index()).copied() {
                    Some(UNSEEN) => {
                        mark[id.index()] = ON_PATH;
                        path.push(id);
                        current = diff.node(id).ok().and_then(|n| n.parent(time));
                    }
                    Some(ON_PATH) => {
                        cycles.push((id, time));
                        break;
                    }
                    _ => break,
                }
            }
            for id in path {
                mark[id.index()] = DONE;
            }
        }
    }
    cycles
}

/// Run [`check_node`] on every given node and collect all failures
///
/// Returns list of (node, error) tuples
pub fn find_node_violations(
    diff: &VariationDiff,
    nodes: &[NodeId],
) -> Vec<(NodeId, VariationDiffError)> {
    nodes
        .iter()
        .filter_map(|id| check_node(diff, *id).err().map(|e| (*id, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffLineNumber, Formula, Label, NodeType};
    use crate::ops::graph_ops::add_child;
    use crate::ops::node_ops::{add_node, create_artifact};

    fn code(diff: &mut VariationDiff, diff_type: DiffType) -> NodeId {
        create_artifact(
            diff,
            diff_type,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            vec!["code".into()],
        )
    }

    #[test]
    fn test_check_node_accepts_well_formed_nodes() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = code(&mut diff, DiffType::Add);
        add_child(&mut diff, root, a, Time::After).unwrap();

        assert!(check_node(&diff, root).is_ok());
        assert!(check_node(&diff, a).is_ok());
    }

    #[test]
    fn test_check_node_rejects_non_with_one_parent() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = code(&mut diff, DiffType::Non);
        add_child(&mut diff, root, a, Time::Before).unwrap();

        assert!(matches!(
            check_node(&diff, a),
            Err(VariationDiffError::InvalidParentArity { diff_type: DiffType::Non, .. })
        ));
    }

    #[test]
    fn test_check_node_rejects_shared_changed_parent() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let parent = code(&mut diff, DiffType::Rem);
        let child = code(&mut diff, DiffType::Non);
        add_child(&mut diff, root, parent, Time::Before).unwrap();
        add_child(&mut diff, parent, child, Time::Before).unwrap();
        // Bypass the existence check of add_child to build the bad edge
        diff.nodes[parent.index()].children[Time::After.index()].push(child);
        diff.nodes[child.index()].parents[Time::After.index()] = Some(parent);

        assert!(matches!(
            check_node(&diff, child),
            Err(VariationDiffError::InvalidParentArity { .. })
        ));
    }

    #[test]
    fn test_check_node_rejects_else_below_artifact() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let artifact = code(&mut diff, DiffType::Add);
        let branch = add_node(
            &mut diff,
            DiffType::Add,
            NodeType::Else,
            DiffLineNumber::invalid(),
            DiffLineNumber::invalid(),
            None,
            Label::single("#else"),
        )
        .unwrap();
        add_child(&mut diff, root, artifact, Time::After).unwrap();
        add_child(&mut diff, artifact, branch, Time::After).unwrap();

        assert!(matches!(
            check_node(&diff, branch),
            Err(VariationDiffError::InvalidBranchParent {
                parent_type: NodeType::Artifact,
                ..
            })
        ));
    }

    #[test]
    fn test_check_node_detects_one_sided_edge() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = code(&mut diff, DiffType::Add);
        diff.nodes[a.index()].parents[Time::After.index()] = Some(root);

        assert!(matches!(
            check_node(&diff, a),
            Err(VariationDiffError::InconsistentEdge { .. })
        ));
    }

    #[test]
    fn test_check_node_rejects_formula_on_artifact() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = code(&mut diff, DiffType::Add);
        add_child(&mut diff, root, a, Time::After).unwrap();
        diff.nodes[a.index()].formula = Some(Formula::True);

        assert!(matches!(
            check_node(&diff, a),
            Err(VariationDiffError::FormulaMismatch { .. })
        ));
    }

    #[test]
    fn test_find_parent_cycles() {
        let mut diff = VariationDiff::default();
        let a = code(&mut diff, DiffType::Rem);
        let b = code(&mut diff, DiffType::Rem);
        add_child(&mut diff, a, b, Time::Before).unwrap();
        add_child(&mut diff, b, a, Time::Before).unwrap();

        let cycles = find_parent_cycles(&diff, &[a, b]);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].1, Time::Before);
    }
}
