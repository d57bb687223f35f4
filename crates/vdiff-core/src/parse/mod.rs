//! Line diff parser
//!
//! Turns a line diff of C preprocessor annotated source into a
//! [`VariationDiff`], or a plain source file into a [`VariationTree`].

pub mod annotation;
pub mod input;
mod logical_line;
pub mod options;
pub mod parser;

pub use annotation::{AnnotationParser, CppAnnotationParser};
pub use input::strip_unified_headers;
pub use options::ParseOptions;
pub use parser::VariationDiffParser;

use crate::errors::Result;
use crate::model::{DiffSource, VariationDiff, VariationTree};

/// Parse a line diff with the C preprocessor dialect
///
/// # Errors
/// * `Parse` - If the diff or its annotations are malformed
pub fn parse_diff(text: &str, options: ParseOptions) -> Result<VariationDiff> {
    VariationDiffParser::new(options).parse_diff(text, DiffSource::Unknown)
}

/// Parse a plain source file with the C preprocessor dialect
///
/// # Errors
/// * `Parse` - If the annotations are malformed
pub fn parse_variation_tree(text: &str, options: ParseOptions) -> Result<VariationTree> {
    VariationDiffParser::new(options).parse_variation_tree(text, DiffSource::Unknown)
}
