//! Text output of diffs and their projections

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::errors::{Result, VariationDiffError};
use crate::model::{DiffType, NodeId, Time, VariationDiff};
use crate::{log_op_end, log_op_error, log_op_start};

const ENDIF: &str = "#endif";

/// Sort key of an emitted line: diff position, then synthetic lines, then order within
type LineKey = (i32, u8, u32);

struct Entry {
    key: LineKey,
    symbol: &'static str,
    text: String,
}

/// Render `diff` as a line diff
///
/// Every label line is prefixed with the symbol of its node's diff type and
/// placed at its diff position. Recorded `#endif` lines are emitted once per
/// diff position; IF nodes without one get a synthetic `#endif` after their
/// subtree. Unchanged empty lines come out as a single space.
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
/// * `OrphanOrCycle` - If the child edges loop
pub fn unparse_diff(diff: &VariationDiff) -> Result<String> {
    let op = "unparse_diff";
    log_op_start!(op, node_count = diff.arena_len());
    let start = Instant::now();

    let text = collect_entries(diff).map(render_entries).map_err(|e| {
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
        line_count = text.lines().count()
    );
    Ok(text)
}

fn render_entries(mut entries: Vec<Entry>) -> String {
    // Stable: ties keep preorder
    entries.sort_by_key(|e| e.key);
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry.symbol);
        out.push_str(&entry.text);
        out.push('\n');
    }
    out
}

fn collect_entries(diff: &VariationDiff) -> Result<Vec<Entry>> {
    let mut collector = Collector {
        diff,
        entries: Vec::new(),
        visited: HashSet::new(),
        closed_lines: HashSet::new(),
        subtree_end: HashMap::new(),
    };
    collector.visit(diff.root(), 0)?;
    Ok(collector.entries)
}

struct Collector<'a> {
    diff: &'a VariationDiff,
    entries: Vec<Entry>,
    visited: HashSet<NodeId>,
    closed_lines: HashSet<i32>,
    subtree_end: HashMap<NodeId, i32>,
}

impl Collector<'_> {
    fn visit(&mut self, id: NodeId, depth: usize) -> Result<()> {
        if depth > self.diff.arena_len() {
            return Err(VariationDiffError::OrphanOrCycle { node: id });
        }
        if !self.visited.insert(id) {
            return Ok(());
        }
        let node = self.diff.node(id)?;

        if !node.is_root() {
            let symbol = node.diff_type().symbol();
            for (k, line) in node.label().lines().iter().enumerate() {
                self.entries.push(Entry {
                    key: (node.from.in_diff, 0, line_index(k)),
                    symbol,
                    text: line.clone(),
                });
            }
        }

        for child in self.diff.all_children(id)? {
            self.visit(child, depth + 1)?;
        }

        if node.is_if() {
            self.close(id, depth)?;
        }
        Ok(())
    }

    /// Emit the `#endif` lines of an IF
    fn close(&mut self, id: NodeId, depth: usize) -> Result<()> {
        let node = self.diff.node(id)?;
        let mut missing = Vec::new();
        for time in node.diff_type().times() {
            match node.closing(time) {
                Some(closing) => {
                    if self.closed_lines.insert(closing.line.in_diff) {
                        let symbol = closing.diff_type.symbol();
                        for (k, line) in closing.label.lines().iter().enumerate() {
                            self.entries.push(Entry {
                                key: (closing.line.in_diff, 0, line_index(k)),
                                symbol,
                                text: line.clone(),
                            });
                        }
                    }
                }
                None => missing.push(time),
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let end = self.subtree_end(id, 0)?;
        let innermost_first = u32::MAX - line_index(depth);
        let symbols: Vec<&'static str> = match DiffType::that_exists_only_at_all(&missing) {
            Some(DiffType::Non) => vec![DiffType::Non.symbol()],
            _ => missing
                .iter()
                .map(|t| DiffType::that_exists_only_at(*t).symbol())
                .collect(),
        };
        for symbol in symbols {
            self.entries.push(Entry {
                key: (end, 1, innermost_first),
                symbol,
                text: ENDIF.to_string(),
            });
        }
        Ok(())
    }

    /// Last diff position used by `id` and everything below it
    fn subtree_end(&mut self, id: NodeId, depth: usize) -> Result<i32> {
        if let Some(end) = self.subtree_end.get(&id) {
            return Ok(*end);
        }
        if depth > self.diff.arena_len() {
            return Err(VariationDiffError::OrphanOrCycle { node: id });
        }
        let node = self.diff.node(id)?;
        let lines = i32::try_from(node.label().lines().len()).unwrap_or(i32::MAX);
        let mut end = node.from.in_diff + lines.max(1) - 1;
        for closing in Time::ALL.iter().filter_map(|t| node.closing(*t)) {
            end = end.max(closing.line.in_diff);
        }
        for child in self.diff.all_children(id)? {
            end = end.max(self.subtree_end(child, depth + 1)?);
        }
        self.subtree_end.insert(id, end);
        Ok(end)
    }
}

fn line_index(k: usize) -> u32 {
    u32::try_from(k).unwrap_or(u32::MAX)
}

/// Render the source text of the projection at `time`
///
/// Prints label lines in preorder and closes every IF with its recorded
/// `#endif` line, or a plain `#endif` when none was recorded.
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
/// * `OrphanOrCycle` - If the child edges at `time` loop
pub fn print_source(diff: &VariationDiff, time: Time) -> Result<String> {
    let mut out = String::new();
    print_subtree(diff, diff.root(), time, 0, &mut out)?;
    Ok(out)
}

fn print_subtree(
    diff: &VariationDiff,
    id: NodeId,
    time: Time,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    if depth > diff.arena_len() {
        return Err(VariationDiffError::OrphanOrCycle { node: id });
    }
    let node = diff.node(id)?;
    if !node.is_root() {
        for line in node.label().lines() {
            out.push_str(line);
            out.push('\n');
        }
    }
    for child in diff.children(id, time)? {
        print_subtree(diff, *child, time, depth + 1, out)?;
    }
    if node.is_if() {
        match node.closing(time) {
            Some(closing) => {
                for line in closing.label.lines() {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            None => {
                out.push_str(ENDIF);
                out.push('\n');
            }
        }
    }
    Ok(())
}
