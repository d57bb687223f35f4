//! vdiff Core - Variation tree diffs
//!
//! This crate models edits to C preprocessor annotated source code as a
//! single graph that holds the variation tree before and after the edit,
//! including:
//! - The arena-backed `VariationDiff` model and its per-time projections
//! - Graph edits that keep parent and child edges in sync
//! - A line diff parser for `#if`/`#elif`/`#else`/`#endif` annotations
//! - Diff construction and refinement from tree matchings
//! - Invariant checking, traversal queries and equality
//! - Transformers that simplify diffs in place
//! - Unparsing back to diff text and rendering as listing or JSON

pub mod construction;
pub mod errors;
pub mod logging_facility;
pub mod matching;
pub mod model;
pub mod ops;
pub mod parse;
pub mod projection;
pub mod render;
pub mod rules;
pub mod transform;
pub mod traversal;
pub mod unparse;

// Used by the logging macros
pub use vdiff_core_types::schema;

// Re-export commonly used types
pub use construction::{diff_using_matching, improve_matching};
pub use errors::{ParseError, ParseErrorKind, Result, VariationDiffError, VdError, VdErrorKind};
pub use matching::{GreedyMatcher, Matcher, Matching};
pub use model::{
    DiffLineNumber, DiffNode, DiffSource, DiffType, Formula, Label, NodeId, NodeType, StableId,
    Time, VariationDiff, VariationTree,
};
pub use parse::{parse_diff, parse_variation_tree, ParseOptions, VariationDiffParser};
pub use projection::{Projection, ProjectionMut};
pub use transform::{apply_transformers, VariationDiffTransformer};
pub use unparse::{print_source, unparse_diff};
