// SPDX-License-Identifier: GPL-3.0-only

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::ParseOutcome;

/// Number of columns requested from `lvs` for the detailed view.
pub const DETAILED_FIELD_COUNT: usize = 8;

/// One row of the detailed attribute listing
///
/// Values are kept as the tool printed them (trimmed). Sizes are gigabytes
/// and may use a comma as decimal separator depending on the locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedRecord {
    pub name: String,
    pub path: String,
    pub size_gb: String,
    pub attr_flags: String,
    pub origin: String,
    pub data_percent: String,
    pub meta_percent: String,
    pub created_at: String,
}

impl DetailedRecord {
    /// Build from exactly [`DETAILED_FIELD_COUNT`] fields, in `lvs` column order.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        let [
            name,
            path,
            size_gb,
            attr_flags,
            origin,
            data_percent,
            meta_percent,
            created_at,
        ] = fields
        else {
            return None;
        };

        Some(Self {
            name: name.clone(),
            path: path.clone(),
            size_gb: size_gb.clone(),
            attr_flags: attr_flags.clone(),
            origin: origin.clone(),
            data_percent: data_percent.clone(),
            meta_percent: meta_percent.clone(),
            created_at: created_at.clone(),
        })
    }

    pub fn is_snapshot(&self) -> bool {
        !self.origin.is_empty()
    }

    /// Creation time, when it is in the `lv_time` format `lvs` prints by default.
    pub fn created_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(self.created_at.trim(), "%Y-%m-%d %H:%M:%S %z").ok()
    }
}

/// Parsed detailed listing together with the text it came from, kept for
/// copy/export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    pub records: Vec<ParseOutcome<DetailedRecord>>,
    pub raw: String,
}

impl DetailedReport {
    pub fn parsed(&self) -> impl Iterator<Item = &DetailedRecord> {
        self.records.iter().filter_map(|record| match record {
            ParseOutcome::Parsed(record) => Some(record),
            _ => None,
        })
    }

    /// Raw rows that could not be aligned to eight columns.
    pub fn malformed(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|record| match record {
            ParseOutcome::Malformed(raw) => Some(raw.as_str()),
            _ => None,
        })
    }
}
