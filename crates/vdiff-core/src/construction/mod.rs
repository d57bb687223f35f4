//! Diffs built from tree matchings
//!
//! [`diff_using_matching`] compares two variation trees;
//! [`improve_matching`] re-matches the REM and ADD parts of an existing diff.

pub mod diff_using_matching;
pub mod improve_matching;

pub use diff_using_matching::diff_using_matching;
pub use improve_matching::{extract_matching, improve_matching, join_node, split_node};
