// SPDX-License-Identifier: GPL-3.0-only

//! LVM snapshot orchestration over the lvm2 command-line tools
//!
//! This crate drives `lvs`, `vgs`, `lvcreate`, `lvremove` and `mount` to:
//! - List logical volumes and flag snapshots
//! - Report snapshot usage and volume group capacity
//! - Create, remove and mount snapshots off the caller's thread
//! - Recover the detailed attribute listing from irregular CSV output
//!
//! All process execution goes through [`CommandRunner`], so a presentation
//! layer (or a test) can swap in its own runner. Most of these commands need
//! root.

pub mod capacity;
pub mod command;
pub mod detail;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod lifecycle;
pub mod manager;
pub mod parse;
pub mod tools;
pub mod version;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use error::{Result, SysError};
pub use executor::{LifecycleExecutor, OperationHandle};
pub use lifecycle::SnapshotLifecycle;
pub use manager::SnapshotManager;
pub use tools::{REQUIRED_TOOLS, missing_tools};
