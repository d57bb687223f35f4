//! In-place rewrites of whole diffs
//!
//! A transformer simplifies a diff for analysis, for example by cutting
//! unchanged code or merging lines that were only moved. Transformers may
//! name other transformers that have to run before them; the order is
//! checked before the diff is touched.

mod collapse_nested;
mod cut_non_edited;
mod moved_artifacts;

pub use collapse_nested::CollapseNestedNonEditedAnnotations;
pub use cut_non_edited::CutNonEditedSubtrees;
pub use moved_artifacts::NaiveMovedArtifactDetection;

use std::time::Instant;

use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, Time, VariationDiff};
use crate::ops::graph_ops::insert_child;
use crate::rules::validation::assert_consistency;
use crate::{log_op_end, log_op_error, log_op_start};

/// A rewrite of a diff in place
pub trait VariationDiffTransformer {
    /// Name used in dependency declarations and logs
    fn name(&self) -> &'static str;

    /// Names of the transformers that must have run before this one
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Rewrite `diff`
    ///
    /// A failure may leave `diff` half rewritten; use
    /// [`apply_transformers`] to keep the input intact on error.
    fn transform(&self, diff: &mut VariationDiff) -> Result<()>;
}

/// Check that every transformer comes after the ones it depends on
///
/// # Errors
/// * `UnmetTransformerDependency` - For the first transformer whose
///   dependency is missing from the transformers before it
pub fn check_dependencies(transformers: &[&dyn VariationDiffTransformer]) -> Result<()> {
    for (position, transformer) in transformers.iter().enumerate() {
        let earlier = &transformers[..position];
        for required in transformer.dependencies() {
            if !earlier.iter().any(|t| t.name() == *required) {
                return Err(VariationDiffError::UnmetTransformerDependency {
                    transformer: transformer.name().to_string(),
                    requires: required.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Run `transformers` in order over `diff`
///
/// The transformers work on a copy; `diff` is only replaced when the
/// dependency check, every transformer and the final consistency check
/// succeed.
///
/// # Errors
/// * `UnmetTransformerDependency` - If the order breaks a dependency
/// * Any error of a transformer or invariant violation of its result
pub fn apply_transformers(
    transformers: &[&dyn VariationDiffTransformer],
    diff: &mut VariationDiff,
) -> Result<()> {
    let op = "apply_transformers";
    log_op_start!(op, node_count = diff.arena_len());
    let start = Instant::now();

    let transformed = run_all(transformers, diff).map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    *diff = transformed;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        node_count = diff.arena_len()
    );
    Ok(())
}

fn run_all(
    transformers: &[&dyn VariationDiffTransformer],
    diff: &VariationDiff,
) -> Result<VariationDiff> {
    check_dependencies(transformers)?;

    let mut working = diff.clone();
    for transformer in transformers {
        tracing::debug!(transformer = transformer.name(), "running transformer");
        transformer.transform(&mut working)?;
    }
    assert_consistency(&working)?;
    Ok(working)
}

/// Parent of `node` at `time` and the node's position below it
type Slot = Option<(NodeId, usize)>;

fn slot(diff: &VariationDiff, node: NodeId, time: Time) -> Result<Slot> {
    let Some(parent) = diff.parent(node, time)? else {
        return Ok(None);
    };
    let index = diff
        .index_of_child(parent, node, time)?
        .ok_or(VariationDiffError::InconsistentEdge {
            parent,
            child: node,
            time,
        })?;
    Ok(Some((parent, index)))
}

/// Attach `node` at the recorded slots, for the times it exists
fn place(diff: &mut VariationDiff, node: NodeId, before: Slot, after: Slot) -> Result<()> {
    let times = diff.node(node)?.diff_type().times();
    for time in times {
        if let Some((parent, index)) = time.select(before, after) {
            insert_child(diff, parent, node, index, time)?;
        }
    }
    Ok(())
}
