use serde::{Deserialize, Serialize};

/// Parser settings
///
/// Deserializable from a `[parse]` table; missing keys take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Merge adjacent code lines of the same diff type into one ARTIFACT
    pub collapse_multiple_code_lines: bool,
    /// Drop blank lines instead of turning them into ARTIFACT nodes
    pub ignore_empty_lines: bool,
}

impl ParseOptions {
    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse_multiple_code_lines = collapse;
        self
    }

    pub fn with_ignore_empty_lines(mut self, ignore: bool) -> Self {
        self.ignore_empty_lines = ignore;
        self
    }
}
