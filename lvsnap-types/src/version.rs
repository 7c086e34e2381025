// SPDX-License-Identifier: GPL-3.0-only

//! LVM toolchain version numbers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Newest toolchain release the parsers were checked against.
pub const TESTED_VERSION: [u32; 3] = [2, 3, 30];

/// Dotted version as a list of numbers, compared lexicographically.
///
/// Not fixed to three components: `2.03.16.1` parses to four.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTuple(pub Vec<u32>);

impl VersionTuple {
    /// Parse a version token such as `2.03.30(2)`.
    ///
    /// Anything from the first `(` on is ignored. Each dot-separated segment
    /// is read as a number; a segment that is not a plain number keeps only
    /// its digits, and a segment without digits counts as 0. Segments too
    /// large for `u32` saturate so they still compare as newer.
    pub fn parse(raw: &str) -> Self {
        let version = raw.split('(').next().unwrap_or_default().trim();
        VersionTuple(version.split('.').map(parse_segment).collect())
    }

    pub fn tested() -> Self {
        VersionTuple(TESTED_VERSION.to_vec())
    }

    pub fn is_newer_than_tested(&self) -> bool {
        *self > Self::tested()
    }

    /// Warning to show when the installed toolchain is newer than the one
    /// the output parsers were checked against.
    pub fn compatibility_warning(&self) -> Option<String> {
        if !self.is_newer_than_tested() {
            return None;
        }

        Some(format!(
            "Detected LVM version {self} is newer than tested version {}.\n\
             Some features may not work as expected.",
            Self::tested()
        ))
    }
}

fn parse_segment(segment: &str) -> u32 {
    if let Ok(value) = segment.parse() {
        return value;
    }

    let digits: String = segment.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}
