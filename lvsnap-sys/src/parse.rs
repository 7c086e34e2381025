// SPDX-License-Identifier: GPL-3.0-only

//! Parsers for `lvs`, `vgs` and `lvm version` output
//!
//! All functions here are pure: they take text already captured from a tool
//! and never run anything. Numeric columns accept either `.` or `,` as the
//! decimal separator because `lvs` follows the caller's locale.

use lvsnap_types::{
    DETAILED_FIELD_COUNT, DetailedRecord, LogicalVolume, ParseOutcome, SnapshotUsage,
    VersionTuple, VolumeGroupCapacity,
};
use tracing::{debug, warn};

/// Raw comma-separated tokens a detailed row needs before repair is attempted.
const MIN_DETAILED_TOKENS: usize = 6;

/// Parse one `lv_name vg_name [origin]` row.
///
/// Rows with fewer than two columns are dropped.
pub fn parse_inventory_line(line: &str) -> Option<LogicalVolume> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let vg_name = parts.next()?;
    let is_snapshot = parts.next().is_some_and(|origin| !origin.is_empty());

    Some(LogicalVolume::new(vg_name, name, is_snapshot))
}

/// Parse the whole inventory listing, keeping the tool's row order.
pub fn parse_inventory(output: &str) -> Vec<LogicalVolume> {
    output
        .lines()
        .filter_map(|line| {
            let volume = parse_inventory_line(line);
            if volume.is_none() && !line.trim().is_empty() {
                debug!(line, "dropping short inventory row");
            }
            volume
        })
        .collect()
}

/// Parse a number printed with `--nosuffix`, tolerating `,` decimals and a
/// trailing `%`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%').replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Find the `lv_name lv_size data_percent` row for `lv_name` and compute
/// how much of the snapshot is used.
///
/// No matching row gives `Unknown`; a matching row with unreadable numbers
/// gives `Malformed`. Percentages outside `0..=100` are clamped and logged.
pub fn parse_snapshot_info(output: &str, lv_name: &str) -> ParseOutcome<SnapshotUsage> {
    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 || parts[0] != lv_name {
            continue;
        }

        let (Some(size_mb), Some(percent)) = (parse_decimal(parts[1]), parse_decimal(parts[2]))
        else {
            warn!(line, "unreadable snapshot usage row");
            return ParseOutcome::Malformed(line.trim().to_string());
        };

        return match SnapshotUsage::clamped(size_mb, percent) {
            Some((usage, clamped)) => {
                if clamped {
                    warn!(lv_name, percent, "snapshot data percent out of range, clamped");
                }
                ParseOutcome::Parsed(usage)
            }
            None => {
                warn!(line, "negative snapshot size");
                ParseOutcome::Malformed(line.trim().to_string())
            }
        };
    }

    ParseOutcome::Unknown
}

/// Parse the single `vg_free vg_size` row printed by `vgs`.
pub fn parse_vg_capacity(output: &str) -> ParseOutcome<VolumeGroupCapacity> {
    let line = output.trim();
    if line.is_empty() {
        return ParseOutcome::Unknown;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [free, total] = parts.as_slice() else {
        warn!(line, "unexpected volume group capacity row");
        return ParseOutcome::Malformed(line.to_string());
    };

    match (parse_decimal(free), parse_decimal(total)) {
        (Some(free_mb), Some(total_mb)) if free_mb >= 0.0 && free_mb <= total_mb => {
            ParseOutcome::Parsed(VolumeGroupCapacity { free_mb, total_mb })
        }
        _ => {
            warn!(line, "unreadable volume group capacity row");
            ParseOutcome::Malformed(line.to_string())
        }
    }
}

/// Re-align one comma-separated detailed row to its eight columns.
///
/// `lvs` output does not split cleanly on commas:
///
/// 1. with a comma decimal separator the size column spans two fields, so
///    fields 2 and 3 are merged back together;
/// 2. a missing origin can drop the column entirely, which shows up as
///    seven fields, so an empty origin is inserted at position 4;
/// 3. the timestamp can itself contain commas, so everything from field 7
///    on is joined into one.
///
/// Short rows are then padded with empty trailing columns. Rows with fewer
/// than six raw tokens are returned as repaired so far and will not have
/// eight fields. This is tuned to one observed output shape; treat the
/// result as a best-effort normalization.
pub fn repair_detailed_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line.split(',').map(str::to_string).collect();
    let raw_count = fields.len();

    if fields.len() >= 4 {
        let merged = format!("{},{}", fields[2], fields[3]);
        fields.splice(2..4, [merged]);
    }

    if fields.len() == DETAILED_FIELD_COUNT - 1 {
        fields.insert(4, String::new());
    }

    if fields.len() > DETAILED_FIELD_COUNT {
        let timestamp = fields.split_off(DETAILED_FIELD_COUNT - 1).join(",");
        fields.push(timestamp);
    }

    if raw_count >= MIN_DETAILED_TOKENS && fields.len() < DETAILED_FIELD_COUNT {
        debug!(line, "padding short detailed row");
        fields.resize(DETAILED_FIELD_COUNT, String::new());
    }

    fields.into_iter().map(|field| field.trim().to_string()).collect()
}

/// `<digits>,<digits>`: a size whose decimal comma split it across two fields.
fn is_split_decimal(value: &str) -> bool {
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    value
        .split_once(',')
        .is_some_and(|(whole, fraction)| is_digits(whole) && is_digits(fraction))
}

/// Parse one detailed row, flagging rows that do not repair to eight columns.
///
/// The repair assumes a comma decimal separator; a row whose size column
/// does not come out as `<digits>,<digits>` (e.g. `20.00` printed under a
/// `.` locale) is `Malformed` rather than shifted.
pub fn parse_detailed_line(line: &str) -> ParseOutcome<DetailedRecord> {
    let line = line.trim();
    if line.is_empty() {
        return ParseOutcome::Unknown;
    }

    let fields = repair_detailed_fields(line);
    if fields.len() == DETAILED_FIELD_COUNT && !is_split_decimal(&fields[2]) {
        warn!(line, size = %fields[2], "detailed row size column is not a split decimal");
        return ParseOutcome::Malformed(line.to_string());
    }

    match DetailedRecord::from_fields(&fields) {
        Some(record) => ParseOutcome::Parsed(record),
        None => {
            warn!(line, fields = fields.len(), "detailed row did not repair to eight columns");
            ParseOutcome::Malformed(line.to_string())
        }
    }
}

/// Parse every non-blank row of the detailed listing.
pub fn parse_detailed(output: &str) -> Vec<ParseOutcome<DetailedRecord>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_detailed_line)
        .collect()
}

/// Pull the version out of `lvm version` output.
///
/// Looks for the `LVM version:` row and parses its first word.
pub fn parse_version_report(output: &str) -> Option<VersionTuple> {
    output.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        if key.trim() != "LVM version" {
            return None;
        }
        let token = value.split_whitespace().next()?;
        Some(VersionTuple::parse(token))
    })
}
