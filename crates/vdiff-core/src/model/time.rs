use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time relative to an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Time {
    Before,
    After,
}

impl Time {
    /// Both times, in order
    pub const ALL: [Time; 2] = [Time::Before, Time::After];

    /// The opposite time
    pub fn other(self) -> Time {
        match self {
            Time::Before => Time::After,
            Time::After => Time::Before,
        }
    }

    /// Slot index for the two-element per-time arrays
    pub fn index(self) -> usize {
        match self {
            Time::Before => 0,
            Time::After => 1,
        }
    }

    /// Pick `before` or `after` depending on this time
    pub fn select<T>(self, before: T, after: T) -> T {
        match self {
            Time::Before => before,
            Time::After => after,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Time::Before => write!(f, "before"),
            Time::After => write!(f, "after"),
        }
    }
}

impl std::str::FromStr for Time {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Time::Before),
            "after" => Ok(Time::After),
            other => Err(format!("unknown time: {}", other)),
        }
    }
}
