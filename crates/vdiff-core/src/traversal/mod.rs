//! Read-only walks over a diff
//!
//! Every walk starts at the root, so nodes detached by graph operations are
//! never visited.

pub mod preorder;
pub mod queries;

pub use preorder::{for_all, for_all_preorder_at, preorder, preorder_at};
pub use queries::{
    all_match, any_match, compute_all_nodes_that, compute_annotation_nodes,
    compute_artifact_nodes, compute_size, count, is_empty, node_with_stable_id, none_match,
};
