use std::time::Instant;

use crate::errors::{ParseError, ParseErrorKind, Result, VariationDiffError};
use crate::model::{
    ClosingLine, DiffLineNumber, DiffSource, DiffType, Label, NodeId, NodeType, Time,
    VariationDiff, VariationTree,
};
use crate::ops::graph_ops::add_below;
use crate::ops::node_ops::{add_lines, add_node};
use crate::rules::validation::assert_consistency;
use crate::{log_op_end, log_op_error, log_op_start};

use super::annotation::{AnnotationParser, CppAnnotationParser};
use super::logical_line::LogicalLine;
use super::options::ParseOptions;

/// One physical input line, classified
struct DiffLine<'a> {
    diff_type: Option<DiffType>,
    content: &'a str,
}

/// Builds variation diffs from line diffs of C preprocessor annotated source
///
/// # Example
///
/// ```
/// use vdiff_core::parse::{ParseOptions, VariationDiffParser};
/// use vdiff_core::model::DiffSource;
///
/// let parser = VariationDiffParser::new(ParseOptions::default());
/// let diff = parser
///     .parse_diff(" code0\n+#if A\n+ added\n+#endif\n", DiffSource::Unknown)
///     .unwrap();
/// assert_eq!(vdiff_core::traversal::compute_size(&diff).unwrap(), 4);
/// ```
pub struct VariationDiffParser<'p> {
    options: ParseOptions,
    annotations: &'p dyn AnnotationParser,
}

impl VariationDiffParser<'static> {
    /// Parser for C preprocessor annotations
    pub fn new(options: ParseOptions) -> Self {
        static CPP: CppAnnotationParser = CppAnnotationParser;
        Self {
            options,
            annotations: &CPP,
        }
    }
}

impl<'p> VariationDiffParser<'p> {
    /// Parser with a custom annotation dialect
    pub fn with_annotations(options: ParseOptions, annotations: &'p dyn AnnotationParser) -> Self {
        Self {
            options,
            annotations,
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a line diff whose lines start with `+`, `-` or a space
    ///
    /// # Errors
    /// * `Parse` - If the diff or its annotations are malformed
    /// * Any invariant violation of the produced graph
    pub fn parse_diff(&self, text: &str, source: DiffSource) -> Result<VariationDiff> {
        let op = "parse_diff";
        log_op_start!(op, line_count = text.lines().count());
        let start = Instant::now();

        let lines = text.lines().map(|line| DiffLine {
            diff_type: DiffType::of_diff_line(line),
            content: line.get(1..).unwrap_or(""),
        });
        let diff = self.parse_lines(lines, source).map_err(|e| {
            log_failure(op, &e, start);
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            node_count = diff.arena_len()
        );
        Ok(diff)
    }

    /// Parse a plain source file as if no line changed
    ///
    /// # Errors
    /// * `Parse` - If the annotations are malformed
    pub fn parse_variation_tree(&self, text: &str, source: DiffSource) -> Result<VariationTree> {
        let op = "parse_variation_tree";
        log_op_start!(op, line_count = text.lines().count());
        let start = Instant::now();

        let lines = text.lines().enumerate().map(|(index, line)| {
            if line.starts_with('+') || line.starts_with('-') {
                tracing::warn!(
                    line = index + 1,
                    "source line starts with a diff symbol; the input may be a diff"
                );
            }
            DiffLine {
                diff_type: Some(DiffType::Non),
                content: line,
            }
        });
        let tree = self
            .parse_lines(lines, source)
            .and_then(VariationTree::from_diff)
            .map_err(|e| {
                log_failure(op, &e, start);
                e
            })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            node_count = tree.as_diff().arena_len()
        );
        Ok(tree)
    }

    fn parse_lines<'l>(
        &self,
        lines: impl Iterator<Item = DiffLine<'l>>,
        source: DiffSource,
    ) -> Result<VariationDiff> {
        let mut state = ParseState::new(self.options, self.annotations, source);

        let mut before_line = LogicalLine::default();
        let mut after_line = LogicalLine::default();
        let mut is_non = false;
        let mut line_number = DiffLineNumber::new(0, 0, 0);

        for line in lines {
            let diff_type = line
                .diff_type
                .ok_or_else(|| parse_error(ParseErrorKind::InvalidDiff, line_number.add(1)))?;
            line_number = line_number.add_for(1, diff_type);

            if self.options.ignore_empty_lines && line.content.trim().is_empty() {
                continue;
            }

            // Both logical lines describe the same unchanged line
            is_non = diff_type == DiffType::Non
                && (is_non || (!before_line.has_started() && !after_line.has_started()));

            for time in diff_type.times() {
                time.select(&mut before_line, &mut after_line)
                    .consume(line.content, line_number);
            }

            if is_non && before_line.is_complete() && after_line.is_complete() {
                state.parse_line(&before_line, DiffType::Non, line_number)?;
                before_line.reset();
                after_line.reset();
            } else {
                if before_line.is_complete() {
                    state.parse_line(&before_line, DiffType::Rem, line_number)?;
                    before_line.reset();
                }
                if after_line.is_complete() {
                    state.parse_line(&after_line, DiffType::Add, line_number)?;
                    after_line.reset();
                }
            }
        }

        if before_line.has_started() || after_line.has_started() {
            tracing::debug!(
                before = %before_line.text(),
                after = %after_line.text(),
                "line continuation but no more lines"
            );
            return Err(parse_error(
                ParseErrorKind::InvalidLineContinuation,
                line_number,
            ));
        }

        state.finish()
    }
}

fn parse_error(kind: ParseErrorKind, line: DiffLineNumber) -> VariationDiffError {
    ParseError::new(kind, line).into()
}

fn log_failure(op: &str, err: &VariationDiffError, start: Instant) {
    log_op_error!(op, err.clone(), duration_ms = start.elapsed().as_millis() as u64);
}

/// Open annotations and the graph built so far
struct ParseState<'p> {
    options: ParseOptions,
    annotations: &'p dyn AnnotationParser,
    diff: VariationDiff,
    stacks: [Vec<NodeId>; 2],
    last_artifact: Option<NodeId>,
}

impl<'p> ParseState<'p> {
    fn new(options: ParseOptions, annotations: &'p dyn AnnotationParser, source: DiffSource) -> Self {
        let diff = VariationDiff::new(source);
        let root = diff.root();
        Self {
            options,
            annotations,
            diff,
            stacks: [vec![root], vec![root]],
            last_artifact: None,
        }
    }

    fn top(&self, time: Time) -> Option<NodeId> {
        self.stacks[time.index()].last().copied()
    }

    /// Turn one complete logical line into a node, or close an if chain
    fn parse_line(
        &mut self,
        line: &LogicalLine,
        diff_type: DiffType,
        last_line_number: DiffLineNumber,
    ) -> Result<()> {
        let from = line.start().unwrap_or(last_line_number).as_type(diff_type);
        let to = last_line_number.add(1).as_type(diff_type);
        let text = line.text();

        let macro_type = self
            .annotations
            .annotation_type(&text)
            .map_err(|kind| parse_error(kind, from))?;

        if macro_type == Some(NodeType::Endif) {
            self.last_artifact = None;
            for time in diff_type.times() {
                self.pop_if_chain(time, from, diff_type, line.lines())?;
            }
            return Ok(());
        }

        if self.options.collapse_multiple_code_lines && macro_type.is_none() {
            if let Some(last) = self.last_artifact {
                let previous = self.diff.node(last)?;
                if previous.diff_type() == diff_type && previous.to.in_diff == from.in_diff {
                    add_lines(&mut self.diff, last, line.lines().to_vec())?;
                    self.diff.node_mut(last)?.to = to;
                    return Ok(());
                }
            }
        }

        let node_type = macro_type.unwrap_or(NodeType::Artifact);
        let formula = if node_type.is_conditional_annotation() {
            Some(
                self.annotations
                    .parse_condition(&text)
                    .map_err(|kind| parse_error(kind, from))?,
            )
        } else {
            None
        };
        let node = add_node(
            &mut self.diff,
            diff_type,
            node_type,
            from,
            to,
            formula,
            Label::new(line.lines().to_vec()),
        )?;
        self.push_node(node, diff_type, node_type, from)?;
        self.last_artifact = node_type.is_artifact().then_some(node);
        Ok(())
    }

    /// Attach `node` below the open annotations and open it if it is one
    fn push_node(
        &mut self,
        node: NodeId,
        diff_type: DiffType,
        node_type: NodeType,
        from: DiffLineNumber,
    ) -> Result<()> {
        if matches!(node_type, NodeType::Elif | NodeType::Else) {
            for time in diff_type.times() {
                let stack = &self.stacks[time.index()];
                if stack.len() <= 1 {
                    return Err(parse_error(ParseErrorKind::ElseOrElifWithoutIf, from));
                }
                let top = self.top(time).ok_or(VariationDiffError::Internal {
                    message: "empty annotation stack".to_string(),
                })?;
                if self.diff.node(top)?.is_else() {
                    return Err(parse_error(ParseErrorKind::ElseAfterElse, from));
                }
            }
        }

        let (before, after) = (self.top(Time::Before), self.top(Time::After));
        add_below(&mut self.diff, node, before, after)?;

        if node_type.is_annotation() {
            for time in diff_type.times() {
                self.stacks[time.index()].push(node);
            }
        }
        Ok(())
    }

    /// Pop the stack of `time` down to and including the nearest IF
    ///
    /// Closed nodes end where the following annotation starts; the IF keeps
    /// the `#endif` line for unparsing.
    fn pop_if_chain(
        &mut self,
        time: Time,
        endif: DiffLineNumber,
        diff_type: DiffType,
        lines: &[String],
    ) -> Result<()> {
        let root = self.diff.root();
        let mut previous = endif;
        loop {
            let top = match self.top(time) {
                Some(top) if top != root => top,
                _ => return Err(parse_error(ParseErrorKind::EndifWithoutIf, endif)),
            };

            let node = self.diff.node_mut(top)?;
            node.to = DiffLineNumber::new(
                previous.in_diff.max(node.to.in_diff),
                match time {
                    Time::Before => previous.before_edit,
                    Time::After => node.to.before_edit,
                },
                match time {
                    Time::Before => node.to.after_edit,
                    Time::After => previous.after_edit,
                },
            );
            previous = node.from;

            let closes_chain = node.is_if();
            if closes_chain {
                node.set_closing(
                    time,
                    Some(ClosingLine {
                        diff_type,
                        line: endif,
                        label: Label::new(lines.to_vec()),
                    }),
                );
            }
            self.stacks[time.index()].pop();
            if closes_chain {
                return Ok(());
            }
        }
    }

    fn finish(self) -> Result<VariationDiff> {
        for time in Time::ALL {
            if self.stacks[time.index()].len() > 1 {
                let top = self.top(time).ok_or(VariationDiffError::Internal {
                    message: "empty annotation stack".to_string(),
                })?;
                let from = self.diff.node(top)?.from;
                return Err(parse_error(ParseErrorKind::NotAllAnnotationsClosed, from));
            }
        }
        assert_consistency(&self.diff)?;
        Ok(self.diff)
    }
}
