use serde::{Deserialize, Serialize};
use std::fmt;

/// The source text carried by a node, one entry per physical line
///
/// Lines are stored without their diff prefix. Line continuation backslashes
/// stay part of the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    lines: Vec<String>,
}

impl Label {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn add_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Label::new(text.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_lines() {
        let mut label = Label::single("int a;");
        label.add_lines(["int b;"]);
        assert_eq!(label.to_string(), "int a;\nint b;");
        assert_eq!(label.lines().len(), 2);
    }
}
