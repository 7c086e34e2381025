// SPDX-License-Identifier: GPL-3.0-only

//! Tagged result of reading loosely structured tool output.

use serde::{Deserialize, Serialize};

/// Outcome of a best-effort parse.
///
/// `Unknown` means the tool said nothing usable (empty output, no matching
/// row, or the command itself failed). `Malformed` keeps the raw text that
/// could not be interpreted so callers and tests can see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ParseOutcome<T> {
    Parsed(T),
    Unknown,
    Malformed(String),
}

impl<T> ParseOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    /// Drop the distinction between `Unknown` and `Malformed`.
    pub fn parsed(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Unknown | ParseOutcome::Malformed(_) => None,
        }
    }

    pub fn as_ref(&self) -> ParseOutcome<&T> {
        match self {
            ParseOutcome::Parsed(value) => ParseOutcome::Parsed(value),
            ParseOutcome::Unknown => ParseOutcome::Unknown,
            ParseOutcome::Malformed(raw) => ParseOutcome::Malformed(raw.clone()),
        }
    }
}
