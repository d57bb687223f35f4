use std::collections::HashSet;

use crate::errors::{Result, VariationDiffError};
use crate::model::{NodeId, VariationDiff};

/// Render a diff as an indented node listing
///
/// One line per reachable node in preorder: two spaces per depth, the diff
/// symbol, the node type, the stable id and then the formula of IF/ELIF
/// nodes or the first label line of any other node. A NON node reachable
/// at both times is listed once.
///
/// # Arguments
/// * `diff` - The diff to render
///
/// # Returns
/// The listing, one node per line
///
/// # Errors
/// * `UnknownNode` - If an edge points outside the arena
/// * `OrphanOrCycle` - If the child edges loop
pub fn render_listing(diff: &VariationDiff) -> Result<String> {
    let mut output = String::new();
    let mut visited = HashSet::new();
    render_subtree(diff, diff.root(), 0, &mut visited, &mut output)?;
    Ok(output)
}

fn render_subtree(
    diff: &VariationDiff,
    id: NodeId,
    depth: usize,
    visited: &mut HashSet<NodeId>,
    output: &mut String,
) -> Result<()> {
    if depth > diff.arena_len() {
        return Err(VariationDiffError::OrphanOrCycle { node: id });
    }
    if !visited.insert(id) {
        return Ok(());
    }
    let node = diff.node(id)?;

    let summary = match node.formula() {
        Some(formula) => formula.to_string(),
        None => node
            .label()
            .lines()
            .first()
            .map(|line| line.trim().to_string())
            .unwrap_or_default(),
    };
    output.push_str(&format!(
        "{}{}{} {} {}\n",
        "  ".repeat(depth),
        node.diff_type().symbol(),
        node.node_type().name().to_uppercase(),
        node.stable_id(),
        summary
    ));

    for child in diff.all_children(id)? {
        render_subtree(diff, child, depth + 1, visited, output)?;
    }
    Ok(())
}
