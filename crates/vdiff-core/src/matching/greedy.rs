use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::errors::{Result, VariationDiffError};

use super::{MatchTree, Matcher, Matching};

/// Greedy top-down and bottom-up tree matcher
///
/// 1. Keeps the seed and pairs the roots.
/// 2. Pairs whole subtrees with equal Merkle digests, preferring the
///    candidate whose parent is already paired with the source parent and
///    otherwise only when the digest is unique on both sides.
/// 3. Below every paired node, pairs unmatched children along the longest
///    common subsequence of `(node type, label)`. Child lists whose table
///    would exceed [`LCS_TABLE_LIMIT`] cells after the common prefix only
///    get the prefix paired here.
/// 4. Pairs remaining children of equal node type and label in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMatcher;

impl Matcher for GreedyMatcher {
    fn match_trees(&self, src: &MatchTree, dst: &MatchTree, seed: Matching) -> Result<Matching> {
        let mut matching = seed;
        if src.is_empty() || dst.is_empty() {
            return Err(VariationDiffError::MatchingContractViolation {
                reason: "cannot match an empty tree".to_string(),
            });
        }
        if !matching.add(src.root(), dst.root()) {
            return Err(VariationDiffError::MatchingContractViolation {
                reason: "seed pairs a root with another node".to_string(),
            });
        }

        match_identical_subtrees(src, dst, &mut matching);
        for_each_matched_pair(src, &mut matching, |s, d, m| {
            match_children_by_lcs(src, dst, s, d, m)
        });
        for_each_matched_pair(src, &mut matching, |s, d, m| {
            match_leftover_children(src, dst, s, d, m)
        });

        tracing::debug!(
            src_size = src.len(),
            dst_size = dst.len(),
            matched_pairs = matching.len(),
            "greedy matching finished"
        );
        Ok(matching)
    }
}

/// Merkle digest per node over node type, label and the child digests
fn subtree_digests(tree: &MatchTree) -> Vec<String> {
    let mut digests = vec![String::new(); tree.len()];
    // Children always have larger preorder indices
    for index in (0..tree.len()).rev() {
        let node = &tree.nodes()[index];
        let mut hasher = Sha256::new();
        hasher.update(node.node_type.name().as_bytes());
        hasher.update([0u8]);
        hasher.update(node.label.as_bytes());
        for child in &node.children {
            hasher.update([0u8]);
            hasher.update(digests[*child].as_bytes());
        }
        digests[index] = hex::encode(hasher.finalize());
    }
    digests
}

fn subtree_sizes(tree: &MatchTree) -> Vec<usize> {
    let mut sizes = vec![1; tree.len()];
    for index in (0..tree.len()).rev() {
        let size: usize = tree.nodes()[index]
            .children
            .iter()
            .map(|c| sizes[*c])
            .sum();
        sizes[index] += size;
    }
    sizes
}

fn match_identical_subtrees(src: &MatchTree, dst: &MatchTree, matching: &mut Matching) {
    let src_digests = subtree_digests(src);
    let dst_digests = subtree_digests(dst);
    let sizes = subtree_sizes(src);

    let mut src_count: HashMap<&str, usize> = HashMap::new();
    for digest in &src_digests {
        *src_count.entry(digest.as_str()).or_default() += 1;
    }
    let mut dst_by_digest: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, digest) in dst_digests.iter().enumerate() {
        dst_by_digest.entry(digest.as_str()).or_default().push(index);
    }

    for s in 1..src.len() {
        if matching.is_src_matched(s) {
            continue;
        }
        let digest = src_digests[s].as_str();
        let Some(all) = dst_by_digest.get(digest) else {
            continue;
        };
        let candidates: Vec<usize> = all
            .iter()
            .copied()
            .filter(|d| !matching.is_dst_matched(*d))
            .collect();

        let expected_parent = src.nodes()[s]
            .parent
            .and_then(|p| matching.dst_for_src(p));
        let by_parent = candidates
            .iter()
            .copied()
            .find(|d| expected_parent.is_some() && dst.nodes()[*d].parent == expected_parent);
        let unique = (all.len() == 1 && src_count.get(digest) == Some(&1))
            .then(|| candidates.first().copied())
            .flatten();

        if let Some(d) = by_parent.or(unique) {
            // Equal digests imply equal shapes, so preorder offsets line up
            for offset in 0..sizes[s] {
                matching.add(s + offset, d + offset);
            }
        }
    }
}

/// Run `step` for every matched pair in source preorder, including pairs added on the way
fn for_each_matched_pair(
    src: &MatchTree,
    matching: &mut Matching,
    mut step: impl FnMut(usize, usize, &mut Matching),
) {
    for s in 0..src.len() {
        if let Some(d) = matching.dst_for_src(s) {
            step(s, d, matching);
        }
    }
}

fn unmatched_children(tree: &MatchTree, parent: usize, is_matched: impl Fn(usize) -> bool) -> Vec<usize> {
    tree.nodes()[parent]
        .children
        .iter()
        .copied()
        .filter(|c| !is_matched(*c))
        .collect()
}

fn same_key(src: &MatchTree, s: usize, dst: &MatchTree, d: usize) -> bool {
    let (a, b) = (&src.nodes()[s], &dst.nodes()[d]);
    a.node_type == b.node_type && a.label == b.label
}

/// Largest LCS table, in cells, built for one pair of child lists
pub const LCS_TABLE_LIMIT: usize = 1 << 22;

fn match_children_by_lcs(src: &MatchTree, dst: &MatchTree, s: usize, d: usize, matching: &mut Matching) {
    let left = unmatched_children(src, s, |c| matching.is_src_matched(c));
    let right = unmatched_children(dst, d, |c| matching.is_dst_matched(c));

    let mut prefix = 0;
    while prefix < left.len()
        && prefix < right.len()
        && same_key(src, left[prefix], dst, right[prefix])
    {
        matching.add(left[prefix], right[prefix]);
        prefix += 1;
    }
    let (left, right) = (&left[prefix..], &right[prefix..]);
    if left.is_empty() || right.is_empty() {
        return;
    }
    if left.len().saturating_mul(right.len()) > LCS_TABLE_LIMIT {
        tracing::debug!(
            left = left.len(),
            right = right.len(),
            "child lists too long for LCS"
        );
        return;
    }

    // lengths[i][j] = LCS of left[i..] and right[j..]
    let mut lengths = vec![vec![0usize; right.len() + 1]; left.len() + 1];
    for i in (0..left.len()).rev() {
        for j in (0..right.len()).rev() {
            lengths[i][j] = if same_key(src, left[i], dst, right[j]) {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if same_key(src, left[i], dst, right[j]) {
            matching.add(left[i], right[j]);
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
}

fn match_leftover_children(src: &MatchTree, dst: &MatchTree, s: usize, d: usize, matching: &mut Matching) {
    let left = unmatched_children(src, s, |c| matching.is_src_matched(c));
    for l in left {
        let candidate = dst.nodes()[d]
            .children
            .iter()
            .copied()
            .find(|r| !matching.is_dst_matched(*r) && same_key(src, l, dst, *r));
        if let Some(r) = candidate {
            matching.add(l, r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{run_matcher, validate_matching};
    use crate::parse::{parse_variation_tree, ParseOptions};

    fn tree(text: &str) -> MatchTree {
        let tree = parse_variation_tree(text, ParseOptions::default()).unwrap();
        MatchTree::from_tree(&tree).unwrap()
    }

    #[test]
    fn test_identical_trees_match_completely() {
        let src = tree("#if A\na\n#endif\nb\n");
        let dst = tree("#if A\na\n#endif\nb\n");

        let m = run_matcher(&GreedyMatcher, &src, &dst, Matching::new()).unwrap();

        assert_eq!(m.len(), src.len());
        for index in 0..src.len() {
            assert!(m.has(index, index));
        }
    }

    #[test]
    fn test_added_line_stays_unmatched() {
        let src = tree("#if A\ncode\n#endif\n");
        let dst = tree("#if A\ncode\ncode2\n#endif\n");

        let m = GreedyMatcher.match_trees(&src, &dst, Matching::new()).unwrap();

        validate_matching(&src, &dst, &m).unwrap();
        assert!(m.has(1, 1));
        assert!(m.has(2, 2));
        assert_eq!(m.src_for_dst(3), None);
    }

    #[test]
    fn test_moved_subtree_is_found_by_digest() {
        let src = tree("#if A\n#if B\nx\n#endif\n#endif\n");
        let dst = tree("#if B\nx\n#endif\n");

        let m = GreedyMatcher.match_trees(&src, &dst, Matching::new()).unwrap();

        assert!(m.has(2, 1));
        assert!(m.has(3, 2));
        assert_eq!(m.dst_for_src(1), None);
    }

    #[test]
    fn test_seed_is_kept() {
        let src = tree("a\nb\n");
        let dst = tree("b\na\n");
        let mut seed = Matching::new();
        seed.add(1, 2);

        let m = GreedyMatcher.match_trees(&src, &dst, seed).unwrap();

        assert!(m.has(1, 2));
        assert!(m.has(2, 1));
    }

    #[test]
    fn test_seed_with_conflicting_root_is_rejected() {
        let src = tree("a\n");
        let dst = tree("a\n");
        let mut seed = Matching::new();
        seed.add(0, 1);

        assert!(GreedyMatcher.match_trees(&src, &dst, seed).is_err());
    }

    #[test]
    fn test_common_prefix_is_paired_before_lcs() {
        let src = tree("a\nb\nc\n");
        let dst = tree("a\nb\nd\nc\n");
        let mut m = Matching::new();
        m.add(0, 0);

        match_children_by_lcs(&src, &dst, 0, 0, &mut m);

        assert!(m.has(1, 1));
        assert!(m.has(2, 2));
        assert!(m.has(3, 4));
        assert_eq!(m.src_for_dst(3), None);
    }

    #[test]
    fn test_long_child_lists_skip_lcs_table() {
        let lines = |even: &str, odd: &str| {
            let mut text = String::new();
            for i in 0..2500 {
                text.push_str(if i % 2 == 0 { even } else { odd });
                text.push('\n');
            }
            text
        };
        let src = tree(&lines("a", "b"));
        let dst = tree(&lines("b", "a"));
        assert!((src.len() - 1) * (dst.len() - 1) > LCS_TABLE_LIMIT);
        let mut m = Matching::new();
        m.add(0, 0);

        match_children_by_lcs(&src, &dst, 0, 0, &mut m);
        assert_eq!(m.len(), 1);

        match_leftover_children(&src, &dst, 0, 0, &mut m);
        assert_eq!(m.len(), src.len());
    }
}
