use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff_type::DiffType;
use super::time::Time;

/// Marker for a line number that does not apply
pub const INVALID_LINE_NUMBER: i32 = -1;

/// A line position in a textual diff
///
/// Holds the position in the diff itself and the corresponding positions in
/// the file before and after the edit. Positions that do not apply, such as
/// the before position of an added line, are [`INVALID_LINE_NUMBER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffLineNumber {
    pub in_diff: i32,
    pub before_edit: i32,
    pub after_edit: i32,
}

impl DiffLineNumber {
    pub fn new(in_diff: i32, before_edit: i32, after_edit: i32) -> Self {
        Self {
            in_diff,
            before_edit,
            after_edit,
        }
    }

    pub fn invalid() -> Self {
        Self::new(INVALID_LINE_NUMBER, INVALID_LINE_NUMBER, INVALID_LINE_NUMBER)
    }

    /// Shift all components by `offset`
    pub fn add(self, offset: i32) -> Self {
        self.add_for(offset, DiffType::Non)
    }

    /// Shift the diff position and the positions of the times `diff_type` exists at
    pub fn add_for(self, offset: i32, diff_type: DiffType) -> Self {
        Self {
            in_diff: self.in_diff + offset,
            before_edit: self.before_edit
                + if diff_type == DiffType::Add { 0 } else { offset },
            after_edit: self.after_edit
                + if diff_type == DiffType::Rem { 0 } else { offset },
        }
    }

    /// Invalidate the positions of the times `diff_type` does not exist at
    pub fn as_type(self, diff_type: DiffType) -> Self {
        Self {
            in_diff: self.in_diff,
            before_edit: if diff_type == DiffType::Add {
                INVALID_LINE_NUMBER
            } else {
                self.before_edit
            },
            after_edit: if diff_type == DiffType::Rem {
                INVALID_LINE_NUMBER
            } else {
                self.after_edit
            },
        }
    }

    pub fn with_line_number_in_diff(self, in_diff: i32) -> Self {
        Self { in_diff, ..self }
    }

    pub fn with_line_number_at_time(self, line: i32, time: Time) -> Self {
        match time {
            Time::Before => Self {
                before_edit: line,
                ..self
            },
            Time::After => Self {
                after_edit: line,
                ..self
            },
        }
    }

    pub fn at_time(self, time: Time) -> i32 {
        time.select(self.before_edit, self.after_edit)
    }

    /// `[from.in_diff, to.in_diff)`
    pub fn range_in_diff(from: DiffLineNumber, to: DiffLineNumber) -> LineRange {
        LineRange::new(from.in_diff, to.in_diff)
    }

    /// `[from, to)` at the given time
    pub fn range_at_time(from: DiffLineNumber, to: DiffLineNumber, time: Time) -> LineRange {
        LineRange::new(from.at_time(time), to.at_time(time))
    }
}

impl fmt::Display for DiffLineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(old: {}, diff: {}, new: {})",
            self.before_edit, self.in_diff, self.after_edit
        )
    }
}

/// A half-open range of line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub from_inclusive: i32,
    pub to_exclusive: i32,
}

impl LineRange {
    pub fn new(from_inclusive: i32, to_exclusive: i32) -> Self {
        Self {
            from_inclusive,
            to_exclusive,
        }
    }

    pub fn invalid() -> Self {
        Self::new(INVALID_LINE_NUMBER, INVALID_LINE_NUMBER)
    }

    pub fn single_line(line: i32) -> Self {
        Self::new(line, line + 1)
    }

    pub fn len(&self) -> usize {
        usize::try_from(self.to_exclusive - self.from_inclusive).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from_inclusive, self.to_exclusive)
    }
}
