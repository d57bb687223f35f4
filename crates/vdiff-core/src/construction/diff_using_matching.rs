use std::collections::HashSet;
use std::time::Instant;

use crate::errors::{Result, VariationDiffError};
use crate::matching::{run_matcher, MatchTree, Matcher, Matching};
use crate::model::{
    ClosingLine, DiffLineNumber, DiffSource, DiffType, NodeId, Time, VariationDiff, VariationTree,
    INVALID_LINE_NUMBER,
};
use crate::ops::copy_ops::unchanged;
use crate::ops::graph_ops::{add_child, drop_at, remove_children};
use crate::ops::node_ops::add_node;
use crate::rules::validation::assert_consistency;
use crate::{log_op_end, log_op_error, log_op_start};

/// Build a diff from two variation trees using a tree matching
///
/// Nodes of `before` that `matcher` pairs with an equally labelled node of
/// `after` become NON, the rest of `before` becomes REM and every unpaired
/// node of `after` is added as ADD. Diff positions are renumbered in
/// preorder, so stable identifiers are unique.
///
/// Neither input is modified; on error no diff is returned.
///
/// # Errors
/// * `MatchingContractViolation` - If the matcher breaks its contract
/// * Any invariant violation of the produced graph
pub fn diff_using_matching(
    before: &VariationTree,
    after: &VariationTree,
    matcher: &dyn Matcher,
) -> Result<VariationDiff> {
    let op = "diff_using_matching";
    log_op_start!(op);
    let start = Instant::now();

    let diff = construct(before, after, matcher).map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        node_count = diff.arena_len()
    );
    Ok(diff)
}

fn construct(
    before: &VariationTree,
    after: &VariationTree,
    matcher: &dyn Matcher,
) -> Result<VariationDiff> {
    let mut diff = unchanged(before)?;
    diff.set_source(DiffSource::Compared {
        before: Box::new(before.source().clone()),
        after: Box::new(after.source().clone()),
    });

    let src = MatchTree::from_projection(&diff, Time::Before)?;
    let dst = MatchTree::from_tree(after)?;
    let matching = run_matcher(matcher, &src, &dst, Matching::new())?;
    tracing::debug!(matched_pairs = matching.len(), "matching accepted");

    remove_unmapped(&mut diff, &src, &dst, &matching)?;

    let mut builder = AfterBuilder {
        diff: &mut diff,
        after: after.as_diff(),
        src: &src,
        dst: &dst,
        matching: &matching,
    };
    let root = builder.diff.root();
    remove_children(builder.diff, root, Time::After)?;
    let top_level = dst
        .get(dst.root())
        .map(|n| n.children.clone())
        .unwrap_or_default();
    for child in top_level {
        builder.add_unmapped(root, child)?;
    }

    renumber(&mut diff)?;
    assert_consistency(&diff)?;
    Ok(diff)
}

/// Paired with an equally labelled destination node
fn kept_counterpart(src: &MatchTree, dst: &MatchTree, matching: &Matching, s: usize) -> Option<usize> {
    let d = matching.dst_for_src(s)?;
    let same_label = src.get(s)?.label == dst.get(d)?.label;
    same_label.then_some(d)
}

/// Turn every source node without a kept counterpart into REM
fn remove_unmapped(
    diff: &mut VariationDiff,
    src: &MatchTree,
    dst: &MatchTree,
    matching: &Matching,
) -> Result<()> {
    for (s, node) in src.nodes().iter().enumerate().skip(1) {
        if kept_counterpart(src, dst, matching, s).is_some() {
            continue;
        }
        drop_at(diff, node.origin, Time::After)?;
        let removed = diff.node_mut(node.origin)?;
        removed.diff_type = DiffType::Rem;
        removed.from = removed.from.as_type(DiffType::Rem);
        removed.to = removed.to.as_type(DiffType::Rem);
        if let Some(mut closing) = removed.closing[Time::Before.index()].take() {
            closing.diff_type = DiffType::Rem;
            removed.closing = [Some(closing), None];
        } else {
            removed.closing = [None, None];
        }
    }
    Ok(())
}

struct AfterBuilder<'a> {
    diff: &'a mut VariationDiff,
    after: &'a VariationDiff,
    src: &'a MatchTree,
    dst: &'a MatchTree,
    matching: &'a Matching,
}

impl AfterBuilder<'_> {
    /// Attach the destination node `d` and its subtree below `parent` at AFTER
    fn add_unmapped(&mut self, parent: NodeId, d: usize) -> Result<()> {
        let (dst, after) = (self.dst, self.after);
        let entry = dst
            .get(d)
            .ok_or_else(|| VariationDiffError::MatchingContractViolation {
                reason: format!("destination index {} out of range", d),
            })?;
        let after_node = after.node(entry.origin)?;

        let reused = self
            .matching
            .src_for_dst(d)
            .filter(|s| kept_counterpart(self.src, self.dst, self.matching, *s) == Some(d))
            .and_then(|s| self.src.get(s))
            .map(|s| s.origin);

        let node = match reused {
            Some(node) => {
                drop_at(self.diff, node, Time::After)?;
                let kept = self.diff.node_mut(node)?;
                kept.from = kept
                    .from
                    .with_line_number_at_time(after_node.from.after_edit, Time::After);
                kept.to = kept
                    .to
                    .with_line_number_at_time(after_node.to.after_edit, Time::After);
                node
            }
            None => {
                let from = after_node.from.after_edit;
                let to = after_node.to.after_edit;
                let added = add_node(
                    self.diff,
                    DiffType::Add,
                    after_node.node_type(),
                    DiffLineNumber::new(INVALID_LINE_NUMBER, from, from).as_type(DiffType::Add),
                    DiffLineNumber::new(INVALID_LINE_NUMBER, to, to).as_type(DiffType::Add),
                    after_node.formula().cloned(),
                    after_node.label().clone(),
                )?;
                let closing = after_node.closing(Time::After).map(|c| ClosingLine {
                    diff_type: DiffType::Add,
                    line: c.line.as_type(DiffType::Add),
                    label: c.label.clone(),
                });
                self.diff.node_mut(added)?.set_closing(Time::After, closing);
                added
            }
        };

        add_child(self.diff, parent, node, Time::After)?;
        remove_children(self.diff, node, Time::After)?;
        for child in entry.children.clone() {
            self.add_unmapped(node, child)?;
        }
        Ok(())
    }
}

/// Assign increasing diff positions in preorder over both times
///
/// Labels take one position per line and the closing line of an IF takes
/// one position after its subtree.
fn renumber(diff: &mut VariationDiff) -> Result<()> {
    let root = diff.root();
    let mut visited = HashSet::from([root]);
    let mut counter = 1;
    for child in diff.all_children(root)? {
        if visited.insert(child) {
            renumber_subtree(diff, child, &mut counter, &mut visited)?;
        }
    }
    Ok(())
}

fn renumber_subtree(
    diff: &mut VariationDiff,
    node: NodeId,
    counter: &mut i32,
    visited: &mut HashSet<NodeId>,
) -> Result<()> {
    let lines = i32::try_from(diff.node(node)?.label().lines().len())
        .map_err(|_| VariationDiffError::Internal {
            message: format!("label of {} is too long", node),
        })?
        .max(1);
    let from = *counter;
    {
        let current = diff.node_mut(node)?;
        current.from = current.from.with_line_number_in_diff(from);
    }
    *counter += lines;

    for child in diff.all_children(node)? {
        if visited.insert(child) {
            renumber_subtree(diff, child, counter, visited)?;
        }
    }

    let current = diff.node_mut(node)?;
    if current.is_annotation() {
        current.to = current.to.with_line_number_in_diff(*counter);
        if current.is_if() && current.closing.iter().any(Option::is_some) {
            for closing in current.closing.iter_mut().flatten() {
                closing.line = closing.line.with_line_number_in_diff(*counter);
            }
            *counter += 1;
        }
    } else {
        current.to = current.to.with_line_number_in_diff(from + lines);
    }
    Ok(())
}
