pub mod diff_node;
pub mod diff_type;
pub mod formula;
pub mod label;
pub mod line_number;
pub mod node_type;
pub mod time;
pub mod variation_diff;
pub mod variation_tree;

pub use diff_node::{ClosingLine, DiffNode, NodeId, StableId};
pub use diff_type::DiffType;
pub use formula::Formula;
pub use label::Label;
pub use line_number::{DiffLineNumber, LineRange, INVALID_LINE_NUMBER};
pub use node_type::NodeType;
pub use time::Time;
pub use variation_diff::{DiffSource, VariationDiff};
pub use variation_tree::VariationTree;
