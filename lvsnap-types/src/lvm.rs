// SPDX-License-Identifier: GPL-3.0-only

//! LVM volume and capacity records
//!
//! Sizes are megabytes as reported by `--units m --nosuffix`, so they are
//! kept as `f64` rather than rounded to integers.

use serde::{Deserialize, Serialize};

use crate::ParseOutcome;

/// A logical volume as listed by `lvs`
///
/// Identity is `(vg_name, name)`. A refresh produces a new set; records are
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalVolume {
    /// Parent volume group name
    pub vg_name: String,

    /// Logical volume name
    pub name: String,

    /// Whether `lvs` reported an origin for this volume
    pub is_snapshot: bool,
}

impl LogicalVolume {
    pub fn new(vg_name: impl Into<String>, name: impl Into<String>, is_snapshot: bool) -> Self {
        Self {
            vg_name: vg_name.into(),
            name: name.into(),
            is_snapshot,
        }
    }

    /// Short form used by the LVM tools: `vg/lv`
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.vg_name, self.name)
    }

    /// List label, with a marker for snapshots
    pub fn label(&self) -> String {
        if self.is_snapshot {
            format!("{} [snapshot]", self.display_name())
        } else {
            self.display_name()
        }
    }

    /// Device node, e.g. `/dev/vg0/snap1`
    pub fn device_path(&self) -> String {
        device_path(&self.vg_name, &self.name)
    }
}

/// Device node for a volume inside a group
pub fn device_path(vg_name: &str, lv_name: &str) -> String {
    format!("/dev/{vg_name}/{lv_name}")
}

/// Copy-on-write space consumed by a snapshot
///
/// Always satisfies `0 <= used_mb <= total_mb`; see [`SnapshotUsage::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotUsage {
    pub used_mb: f64,
    pub total_mb: f64,
}

impl SnapshotUsage {
    /// Build from the snapshot size and its data percent, clamping the
    /// percent into `0..=100`.
    ///
    /// Returns the usage and whether clamping was needed. `None` if the size
    /// is negative or either input is not finite.
    pub fn clamped(total_mb: f64, data_percent: f64) -> Option<(Self, bool)> {
        if !total_mb.is_finite() || !data_percent.is_finite() || total_mb < 0.0 {
            return None;
        }

        let percent = data_percent.clamp(0.0, 100.0);
        let used_mb = total_mb * percent / 100.0;
        Some((Self { used_mb, total_mb }, percent != data_percent))
    }

    /// Usage percentage (0-100)
    pub fn percent(&self) -> f64 {
        if self.total_mb == 0.0 {
            0.0
        } else {
            self.used_mb / self.total_mb * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:.2}% ({:.1} MB / {:.1} MB)",
            self.percent(),
            self.used_mb,
            self.total_mb
        )
    }
}

/// Free and total space of a volume group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeGroupCapacity {
    pub free_mb: f64,
    pub total_mb: f64,
}

impl VolumeGroupCapacity {
    pub fn used_mb(&self) -> f64 {
        self.total_mb - self.free_mb
    }

    /// Usage percentage (0-100)
    pub fn percent(&self) -> f64 {
        if self.total_mb == 0.0 {
            0.0
        } else {
            self.used_mb() / self.total_mb * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:.2}% ({:.1} MB used / {:.1} MB free / {:.1} MB total)",
            self.percent(),
            self.used_mb(),
            self.free_mb,
            self.total_mb
        )
    }
}

/// What to show for a selected volume: a snapshot's own usage, or the
/// capacity of the group a plain volume lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionUsage {
    Snapshot {
        usage: ParseOutcome<SnapshotUsage>,
    },
    Group {
        vg_name: String,
        capacity: ParseOutcome<VolumeGroupCapacity>,
    },
}

impl SelectionUsage {
    pub fn summary(&self) -> String {
        match self {
            SelectionUsage::Snapshot { usage } => match usage {
                ParseOutcome::Parsed(usage) => format!("Snapshot Usage: {}", usage.summary()),
                _ => "Snapshot Usage: Unknown".to_string(),
            },
            SelectionUsage::Group { capacity, .. } => match capacity {
                ParseOutcome::Parsed(capacity) => format!("VG Usage: {}", capacity.summary()),
                _ => "VG Free Space: Unknown".to_string(),
            },
        }
    }
}
