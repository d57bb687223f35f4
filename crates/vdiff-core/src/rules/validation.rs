use std::time::Instant;

use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, Time, VariationDiff};
use crate::traversal;

use super::invariants;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitStatus {
    Stranger,
    Visited,
    AllPathsEndAtRoot,
    NotAllPathsEndAtRoot,
}

/// Memoized check that every parent chain of a node ends at the root
///
/// A node still being resolved when it is reached again counts as ending
/// at the root; [`invariants::find_parent_cycles`] reports such loops.
pub struct AllPathsEndAtRoot<'a> {
    diff: &'a VariationDiff,
    cache: Vec<VisitStatus>,
}

impl<'a> AllPathsEndAtRoot<'a> {
    pub fn new(diff: &'a VariationDiff) -> Self {
        Self {
            diff,
            cache: vec![VisitStatus::Stranger; diff.arena_len()],
        }
    }

    /// Whether all parent chains starting at `node` reach the root
    ///
    /// # Errors
    /// * `UnknownNode` - If a chain leaves the arena
    pub fn check(&mut self, node: NodeId) -> Result<bool> {
        let status = self
            .cache
            .get(node.index())
            .copied()
            .ok_or(VariationDiffError::UnknownNode { node })?;

        match status {
            VisitStatus::AllPathsEndAtRoot | VisitStatus::Visited => Ok(true),
            VisitStatus::NotAllPathsEndAtRoot => Ok(false),
            VisitStatus::Stranger => {
                self.cache[node.index()] = VisitStatus::Visited;

                let current = self.diff.node(node)?;
                let result = if node == self.diff.root() {
                    true
                } else {
                    let before = current.parent(Time::Before);
                    let after = current.parent(Time::After);
                    match (before, after) {
                        (None, None) => false,
                        _ => {
                            let before_ok = match before {
                                Some(parent) => self.check(parent)?,
                                None => true,
                            };
                            before_ok
                                && match after {
                                    Some(parent) => self.check(parent)?,
                                    None => true,
                                }
                        }
                    }
                };

                self.cache[node.index()] = if result {
                    VisitStatus::AllPathsEndAtRoot
                } else {
                    VisitStatus::NotAllPathsEndAtRoot
                };
                Ok(result)
            }
        }
    }
}

/// Outcome of [`is_consistent`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConsistencyResult {
    Success,
    Failure(VariationDiffError),
}

impl ConsistencyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConsistencyResult::Success)
    }

    pub fn failure(&self) -> Option<&VariationDiffError> {
        match self {
            ConsistencyResult::Success => None,
            ConsistencyResult::Failure(err) => Some(err),
        }
    }
}

/// Validate the whole reachable graph
///
/// Runs the node-local checks on every reachable node, then verifies that
/// no parent chain loops and that every parent chain ends at the root.
///
/// # Errors
/// Returns the first violation found:
/// * Any error of [`invariants::check_node`]
/// * `OrphanOrCycle` - If a parent chain loops or ends outside the root
pub fn assert_consistency(diff: &VariationDiff) -> Result<()> {
    let start = Instant::now();
    let nodes = traversal::preorder(diff)?;

    let result = check_all(diff, &nodes);
    match &result {
        Ok(()) => tracing::debug!(
            op = "assert_consistency",
            node_count = nodes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "graph is consistent"
        ),
        Err(err) => tracing::debug!(
            op = "assert_consistency",
            node_count = nodes.len(),
            error = %err,
            "graph is inconsistent"
        ),
    }
    result
}

fn check_all(diff: &VariationDiff, nodes: &[NodeId]) -> Result<()> {
    for id in nodes {
        invariants::check_node(diff, *id)?;
    }

    if let Some((node, _)) = invariants::find_parent_cycles(diff, nodes).first() {
        return Err(VariationDiffError::OrphanOrCycle { node: *node });
    }

    let mut paths = AllPathsEndAtRoot::new(diff);
    for id in nodes {
        if !paths.check(*id)? {
            return Err(VariationDiffError::OrphanOrCycle { node: *id });
        }
    }
    Ok(())
}

/// Non-failing form of [`assert_consistency`]
pub fn is_consistent(diff: &VariationDiff) -> ConsistencyResult {
    match assert_consistency(diff) {
        Ok(()) => ConsistencyResult::Success,
        Err(err) => ConsistencyResult::Failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiffLineNumber, DiffType};
    use crate::ops::graph_ops::add_child;
    use crate::ops::node_ops::create_artifact;

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
    fn test_empty_diff_is_consistent() {
        let diff = VariationDiff::default();
        assert!(assert_consistency(&diff).is_ok());
        assert!(is_consistent(&diff).is_success());
    }

    #[test]
    fn test_parent_outside_root_is_reported() {
        // NON node reachable before the edit, but its after parent hangs in a detached loop
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let a = code(&mut diff, DiffType::Non);
        let x = code(&mut diff, DiffType::Non);
        let y = code(&mut diff, DiffType::Non);
        for time in Time::ALL {
            add_child(&mut diff, x, y, time).unwrap();
        }
        add_child(&mut diff, y, x, Time::Before).unwrap();
        add_child(&mut diff, root, x, Time::After).unwrap();
        add_child(&mut diff, root, a, Time::Before).unwrap();
        add_child(&mut diff, y, a, Time::After).unwrap();

        let result = is_consistent(&diff);

        assert!(matches!(
            result.failure(),
            Some(VariationDiffError::OrphanOrCycle { .. })
        ));
    }

    #[test]
    fn test_memo_reports_detached_parent() {
        let mut diff = VariationDiff::default();
        let root = diff.root();
        let orphan_parent = code(&mut diff, DiffType::Non);
        let child = code(&mut diff, DiffType::Non);
        add_child(&mut diff, root, child, Time::Before).unwrap();
        add_child(&mut diff, orphan_parent, child, Time::After).unwrap();

        let mut paths = AllPathsEndAtRoot::new(&diff);

        assert!(!paths.check(child).unwrap());
        assert!(paths.check(root).unwrap());
    }
}
