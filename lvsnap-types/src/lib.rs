// SPDX-License-Identifier: GPL-3.0-only

//! Value records for the LVM snapshot manager
//!
//! Everything here is an immutable snapshot of what the LVM toolchain reported
//! at one point in time. These models are used throughout the stack:
//!
//! - **lvsnap-sys**: produces them from `lvs`/`vgs`/`lvm` output
//! - **lvsnap-app**: renders them as text or JSON
//!
//! Nothing in this crate talks to the system.

pub mod detail;
pub mod lvm;
pub mod operation;
pub mod outcome;
pub mod version;

pub use detail::{DETAILED_FIELD_COUNT, DetailedRecord, DetailedReport};
pub use lvm::{LogicalVolume, SelectionUsage, SnapshotUsage, VolumeGroupCapacity, device_path};
pub use operation::{LifecycleRequest, OperationResult};
pub use outcome::ParseOutcome;
pub use version::{TESTED_VERSION, VersionTuple};
