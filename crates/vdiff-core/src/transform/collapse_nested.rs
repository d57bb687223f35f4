//! Merging of nested unchanged annotations

use super::cut_non_edited::CutNonEditedSubtrees;
use super::{place, slot, VariationDiffTransformer};
use crate::errors::Result;
use crate::model::{DiffType, Formula, Label, NodeId, NodeType, Time, VariationDiff};
use crate::ops::graph_ops::{drop_node, steal_children_of};
use crate::ops::node_ops::add_node;
use crate::projection::Projection;
use crate::traversal::preorder;

/// Collapse chains of unchanged annotations into a single `#if`
///
/// A chain is a path of at least two unchanged annotations where each one
/// is the only child of the previous one at both times, ending at an
/// annotation with edited children or more than one child. The chain is
/// replaced by one unchanged IF whose formula is the conjunction of the
/// feature mappings along the chain. Runs after [`CutNonEditedSubtrees`],
/// which leaves such chains around deeply nested edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseNestedNonEditedAnnotations;

impl CollapseNestedNonEditedAnnotations {
    pub const NAME: &'static str = "CollapseNestedNonEditedAnnotations";
}

impl VariationDiffTransformer for CollapseNestedNonEditedAnnotations {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[CutNonEditedSubtrees::NAME]
    }

    fn transform(&self, diff: &mut VariationDiff) -> Result<()> {
        let chains = find_chains(diff)?;
        tracing::debug!(chains = chains.len(), "collapsing annotation chains");
        for chain in chains {
            collapse(diff, &chain)?;
        }
        Ok(())
    }
}

fn find_chains(diff: &VariationDiff) -> Result<Vec<Vec<NodeId>>> {
    let mut candidates: Vec<Vec<NodeId>> = Vec::new();
    let mut chains = Vec::new();

    for id in preorder(diff)? {
        let node = diff.node(id)?;
        if node.is_root() || !node.is_non() || !node.is_annotation() {
            continue;
        }

        if is_head(diff, id)? {
            candidates.push(vec![id]);
        } else if in_chain_tail(diff, id)? {
            let parent = node.parent(Time::Before);
            let Some(position) = candidates.iter().position(|c| c.last().copied() == parent)
            else {
                continue;
            };
            candidates[position].push(id);
            if is_end(diff, id)? {
                chains.push(candidates.remove(position));
            }
        }
    }
    Ok(chains)
}

/// Same parent at both times, and that parent has no other child
fn in_chain_tail(diff: &VariationDiff, id: NodeId) -> Result<bool> {
    let node = diff.node(id)?;
    match (node.parent(Time::Before), node.parent(Time::After)) {
        (Some(before), Some(after)) if before == after => Ok(has_one_child(diff, before)?),
        _ => Ok(false),
    }
}

fn is_head(diff: &VariationDiff, id: NodeId) -> Result<bool> {
    let below_root = diff.node(id)?.parent(Time::Before) == Some(diff.root());
    Ok((!in_chain_tail(diff, id)? || below_root) && !is_end(diff, id)?)
}

fn is_end(diff: &VariationDiff, id: NodeId) -> Result<bool> {
    if !in_chain_tail(diff, id)? {
        return Ok(false);
    }
    let children = diff.all_children(id)?;
    let mut edited = false;
    for child in &children {
        edited |= !diff.node(*child)?.is_non();
    }
    Ok(edited || children.len() != 1)
}

fn has_one_child(diff: &VariationDiff, id: NodeId) -> Result<bool> {
    Ok(diff.all_children(id)?.len() == 1)
}

fn collapse(diff: &mut VariationDiff, chain: &[NodeId]) -> Result<()> {
    let (Some(&head), Some(&end)) = (chain.first(), chain.last()) else {
        return Ok(());
    };

    // An ELSE or ELIF mapping already negates the branches before it
    let mut remaining = chain.to_vec();
    let mut clauses = Vec::new();
    while let Some(id) = remaining.pop() {
        clauses.push(Projection::new(diff, id, Time::After)?.feature_mapping()?);
        let mut popped = id;
        if diff.node(id)?.is_else() || diff.node(id)?.is_elif() {
            while !diff.node(popped)?.is_if() {
                match remaining.pop() {
                    Some(next) => popped = next,
                    None => break,
                }
            }
        }
    }
    clauses.reverse();
    let formula = Formula::and_all(clauses);

    let head_node = diff.node(head)?;
    let (from, to) = (head_node.from, head_node.to);
    let closing = Time::ALL.map(|time| head_node.closing(time).cloned());
    let label = Label::single(format!("#if {}", formula));
    let merged = add_node(
        diff,
        DiffType::Non,
        NodeType::If,
        from,
        to,
        Some(formula),
        label,
    )?;
    for (time, closing) in Time::ALL.into_iter().zip(closing) {
        diff.node_mut(merged)?.set_closing(time, closing);
    }

    let before = slot(diff, head, Time::Before)?;
    let after = slot(diff, head, Time::After)?;
    drop_node(diff, head)?;
    steal_children_of(diff, merged, end)?;
    place(diff, merged, before, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_diff, ParseOptions};
    use crate::rules::validation::assert_consistency;
    use crate::traversal::count;
    use crate::unparse::print_source;

    fn collapse_text(text: &str) -> VariationDiff {
        let mut diff = parse_diff(text, ParseOptions::default()).unwrap();
        CutNonEditedSubtrees.transform(&mut diff).unwrap();
        CollapseNestedNonEditedAnnotations
            .transform(&mut diff)
            .unwrap();
        assert_consistency(&diff).unwrap();
        diff
    }

    #[test]
    fn test_collapse_merges_nested_ifs() {
        let diff = collapse_text(" #if A\n #if B\n+x\n #endif\n #endif\n");

        assert_eq!(count(&diff, |n| n.is_if()).unwrap(), 1);
        let merged = diff.children(diff.root(), Time::After).unwrap()[0];
        let merged = diff.node(merged).unwrap();
        assert_eq!(
            merged.formula(),
            Some(&Formula::and_all(vec![
                Formula::literal("A"),
                Formula::literal("B")
            ]))
        );
        assert_eq!(
            print_source(&diff, Time::After).unwrap(),
            "#if A & B\nx\n#endif\n"
        );
        assert_eq!(
            print_source(&diff, Time::Before).unwrap(),
            "#if A & B\n#endif\n"
        );
    }

    #[test]
    fn test_collapse_keeps_single_annotation() {
        let text = " #if A\n+x\n #endif\n";
        let diff = collapse_text(text);

        assert_eq!(print_source(&diff, Time::After).unwrap(), "#if A\nx\n#endif\n");
    }

    #[test]
    fn test_collapse_stops_at_branching_annotation() {
        // The inner IF has two children, so the chain ends there
        let diff = collapse_text(" #if A\n #if B\n+x\n+y\n #endif\n #endif\n");

        assert_eq!(count(&diff, |n| n.is_if()).unwrap(), 1);
        assert_eq!(
            print_source(&diff, Time::After).unwrap(),
            "#if A & B\nx\ny\n#endif\n"
        );
    }

    #[test]
    fn test_collapse_leaves_edited_annotations() {
        let text = "+#if A\n #if B\n+x\n #endif\n+#endif\n";
        let original = parse_diff(text, ParseOptions::default()).unwrap();

        let diff = collapse_text(text);

        for time in Time::ALL {
            assert_eq!(
                print_source(&diff, time).unwrap(),
                print_source(&original, time).unwrap()
            );
        }
    }
}
