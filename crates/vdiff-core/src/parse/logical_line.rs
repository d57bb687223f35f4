use crate::model::DiffLineNumber;

/// Physical lines joined by trailing backslashes or open block comments
#[derive(Debug, Clone, Default)]
pub(crate) struct LogicalLine {
    lines: Vec<String>,
    start: Option<DiffLineNumber>,
    is_continued: bool,
    in_comment: bool,
}

impl LogicalLine {
    /// Whether at least one physical line was consumed
    pub(crate) fn has_started(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the collected lines form a complete logical line
    pub(crate) fn is_complete(&self) -> bool {
        self.has_started() && !self.is_continued && !self.in_comment
    }

    pub(crate) fn start(&self) -> Option<DiffLineNumber> {
        self.start
    }

    /// Append a physical line
    pub(crate) fn consume(&mut self, line: &str, line_number: DiffLineNumber) {
        if self.start.is_none() {
            self.start = Some(line_number);
        }

        self.is_continued = line.ends_with('\\');

        // Only the last comment delimiter of the line decides
        let opened = line.rfind("/*");
        let closed = line.rfind("*/");
        match (opened, closed) {
            (Some(open), Some(close)) => self.in_comment = open > close,
            (Some(_), None) => self.in_comment = true,
            (None, Some(_)) => self.in_comment = false,
            (None, None) => {}
        }

        self.lines.push(line.to_string());
    }

    /// Joined text with the continuation backslashes removed
    pub(crate) fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.strip_suffix('\\').unwrap_or(line))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Physical lines as consumed, for the node label
    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_is_complete() {
        let mut line = LogicalLine::default();
        line.consume("int x;", DiffLineNumber::new(1, 1, 1));
        assert!(line.is_complete());
        assert_eq!(line.text(), "int x;");
    }

    #[test]
    fn test_backslash_continues() {
        let mut line = LogicalLine::default();
        line.consume("#if A && \\", DiffLineNumber::new(1, 1, 1));
        assert!(!line.is_complete());
        line.consume("    B", DiffLineNumber::new(2, 2, 2));
        assert!(line.is_complete());
        assert_eq!(line.lines().len(), 2);
        assert_eq!(line.start(), Some(DiffLineNumber::new(1, 1, 1)));
        assert!(line.text().starts_with("#if A && "));
    }

    #[test]
    fn test_open_comment_continues() {
        let mut line = LogicalLine::default();
        line.consume("#if A /* start", DiffLineNumber::new(1, 1, 1));
        assert!(!line.is_complete());
        line.consume("end */", DiffLineNumber::new(2, 2, 2));
        assert!(line.is_complete());

        line.reset();
        assert!(!line.has_started());
    }
}
