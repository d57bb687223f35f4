use vdiff_core::{
    parse_diff, parse_variation_tree, NodeId, ParseOptions, Time, VariationDiff, VariationTree,
};

/// Parse a diff with default options, panicking on failure
#[allow(dead_code)]
pub fn parse(text: &str) -> VariationDiff {
    parse_diff(text, ParseOptions::default()).unwrap()
}

/// Parse a plain source file with default options, panicking on failure
#[allow(dead_code)]
pub fn tree(text: &str) -> VariationTree {
    parse_variation_tree(text, ParseOptions::default()).unwrap()
}

/// The `index`th child of `parent` at `time`
#[allow(dead_code)]
pub fn child(diff: &VariationDiff, parent: NodeId, time: Time, index: usize) -> NodeId {
    diff.children(parent, time).unwrap()[index]
}

/// Label texts of the children of `parent` at `time`
#[allow(dead_code)]
pub fn child_labels(diff: &VariationDiff, parent: NodeId, time: Time) -> Vec<String> {
    diff.children(parent, time)
        .unwrap()
        .iter()
        .map(|c| diff.node(*c).unwrap().label().to_string())
        .collect()
}

/// Lines of `diff_text` that exist at `time`, without their symbol
#[allow(dead_code)]
pub fn text_at(diff_text: &str, time: Time) -> String {
    let mut out = String::new();
    for line in diff_text.lines() {
        let keep = match line.chars().next() {
            Some('+') => time == Time::After,
            Some('-') => time == Time::Before,
            _ => true,
        };
        if keep {
            out.push_str(line.get(1..).unwrap_or(""));
            out.push('\n');
        }
    }
    out
}
