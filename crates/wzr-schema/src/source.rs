use std::fmt;

use serde::{Deserialize, Serialize};

/// Wizard step identity (stable string: e.g. `details`, `team`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage origin of a fragment.
///
/// Declaration order is the precedence ranking: a lower [`Source::rank`]
/// wins a field-level conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The step's snapshot under the current storage root.
    Current,
    /// Backend columns mirrored at the top level of the record.
    TopLevel,
    /// The step's snapshot under the legacy storage root.
    Legacy,
    /// Values reached through relation pointers (`derived_from`).
    Derived,
}

impl Source {
    /// All sources in precedence order.
    pub const ALL: [Source; 4] = [
        Source::Current,
        Source::TopLevel,
        Source::Legacy,
        Source::Derived,
    ];

    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Current => "current",
            Source::TopLevel => "top_level",
            Source::Legacy => "legacy",
            Source::Derived => "derived",
        }
    }
}
