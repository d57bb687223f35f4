use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::Time;

/// Whether a node was added, removed or left unchanged by an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffType {
    /// Exists only after the edit
    Add,
    /// Exists only before the edit
    Rem,
    /// Exists before and after the edit
    Non,
}

impl DiffType {
    /// Number of bits needed to pack an ordinal
    pub const REQUIRED_BIT_COUNT: u32 = 3;

    pub const ALL: [DiffType; 3] = [DiffType::Add, DiffType::Rem, DiffType::Non];

    pub fn ordinal(self) -> u64 {
        match self {
            DiffType::Add => 0,
            DiffType::Rem => 1,
            DiffType::Non => 2,
        }
    }

    pub fn from_ordinal(ordinal: u64) -> Option<DiffType> {
        DiffType::ALL.into_iter().find(|d| d.ordinal() == ordinal)
    }

    /// The prefix of a diff line of this type
    pub fn symbol(self) -> &'static str {
        match self {
            DiffType::Add => "+",
            DiffType::Rem => "-",
            DiffType::Non => " ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiffType::Add => "ADD",
            DiffType::Rem => "REM",
            DiffType::Non => "NON",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<DiffType> {
        DiffType::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// Classify a raw diff line by its first character
    ///
    /// An empty line counts as an unchanged empty line. Any other leading
    /// character yields `None`.
    pub fn of_diff_line(line: &str) -> Option<DiffType> {
        match line.chars().next() {
            None | Some(' ') => Some(DiffType::Non),
            Some('+') => Some(DiffType::Add),
            Some('-') => Some(DiffType::Rem),
            Some(_) => None,
        }
    }

    pub fn exists_at(self, time: Time) -> bool {
        match (self, time) {
            (DiffType::Non, _) => true,
            (DiffType::Add, Time::After) => true,
            (DiffType::Rem, Time::Before) => true,
            _ => false,
        }
    }

    pub fn exists_before(self) -> bool {
        self.exists_at(Time::Before)
    }

    pub fn exists_after(self) -> bool {
        self.exists_at(Time::After)
    }

    /// The diff type of nodes existing only at `time`
    pub fn that_exists_only_at(time: Time) -> DiffType {
        match time {
            Time::Before => DiffType::Rem,
            Time::After => DiffType::Add,
        }
    }

    /// The diff type of nodes existing exactly at the given times
    pub fn that_exists_only_at_all(times: &[Time]) -> Option<DiffType> {
        let before = times.contains(&Time::Before);
        let after = times.contains(&Time::After);
        match (before, after) {
            (true, true) => Some(DiffType::Non),
            (true, false) => Some(DiffType::Rem),
            (false, true) => Some(DiffType::Add),
            (false, false) => None,
        }
    }

    /// Swap ADD and REM
    pub fn inverse(self) -> DiffType {
        match self {
            DiffType::Add => DiffType::Rem,
            DiffType::Rem => DiffType::Add,
            DiffType::Non => DiffType::Non,
        }
    }

    /// The times at which this diff type exists, in order
    pub fn times(self) -> impl Iterator<Item = Time> {
        Time::ALL.into_iter().filter(move |t| self.exists_at(*t))
    }

    /// Run `f` for every time this diff type exists at, stopping at the first error
    pub fn for_all_times_of_existence<E>(
        self,
        mut f: impl FnMut(Time) -> Result<(), E>,
    ) -> Result<(), E> {
        for time in self.times() {
            f(time)?;
        }
        Ok(())
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
