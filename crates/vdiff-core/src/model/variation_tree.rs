use super::diff_node::NodeId;
use super::time::Time;
use super::variation_diff::{DiffSource, VariationDiff};
use crate::errors::{Result, VariationDiffError};

/// A variation tree: a diff in which nothing changed
///
/// Every reachable node is NON and has the same parent and the same ordered
/// children at both times, so the BEFORE projection is the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationTree {
    diff: VariationDiff,
}

impl VariationTree {
    /// Wrap a diff after checking that it describes an unchanged tree
    ///
    /// # Errors
    /// * `NotAVariationTree` - If a reachable node is not NON or its edges differ between times
    pub fn from_diff(diff: VariationDiff) -> Result<Self> {
        let mut stack = vec![diff.root()];
        while let Some(id) = stack.pop() {
            let node = diff.node(id)?;
            if !node.is_non() {
                return Err(VariationDiffError::NotAVariationTree {
                    reason: format!("node {} is {}", id, node.diff_type()),
                });
            }
            if node.parent(Time::Before) != node.parent(Time::After)
                || node.children(Time::Before) != node.children(Time::After)
            {
                return Err(VariationDiffError::NotAVariationTree {
                    reason: format!("node {} has different edges before and after", id),
                });
            }
            stack.extend(node.children(Time::Before).iter().rev());
        }
        Ok(Self { diff })
    }

    pub(crate) fn from_diff_unchecked(diff: VariationDiff) -> Self {
        Self { diff }
    }

    pub fn root(&self) -> NodeId {
        self.diff.root()
    }

    pub fn source(&self) -> &DiffSource {
        self.diff.source()
    }

    pub fn as_diff(&self) -> &VariationDiff {
        &self.diff
    }

    pub fn into_diff(self) -> VariationDiff {
        self.diff
    }
}

impl AsRef<VariationDiff> for VariationTree {
    fn as_ref(&self) -> &VariationDiff {
        &self.diff
    }
}
