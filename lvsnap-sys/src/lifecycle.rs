// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot create/remove/mount
//!
//! Each operation is one tool invocation (two steps for mount) and reports
//! through [`OperationResult`]. Nothing is retried or rolled back: a failed
//! `lvcreate` leaves no partial snapshot, and a failed mount leaves the
//! mount point directory in place.

use std::path::Path;
use std::sync::Arc;

use lvsnap_types::{LifecycleRequest, OperationResult, device_path};
use tracing::{info, warn};

use crate::command::{CommandRunner, render};

const LVCREATE: &str = "lvcreate";
const LVREMOVE: &str = "lvremove";
const MOUNT: &str = "mount";

/// Runs lifecycle operations synchronously on the calling thread.
///
/// Use [`crate::LifecycleExecutor`] to keep them off a foreground thread.
#[derive(Clone)]
pub struct SnapshotLifecycle {
    runner: Arc<dyn CommandRunner>,
}

impl SnapshotLifecycle {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Create `snapshot` of `vg_name/origin` with capacity `size`.
    ///
    /// `size` is handed to `lvcreate -L` as is (`100M`, `1G`, ...).
    pub fn create(
        &self,
        vg_name: &str,
        origin: &str,
        snapshot: &str,
        size: &str,
    ) -> OperationResult {
        let snapshot = snapshot.trim();
        if snapshot.is_empty() {
            return OperationResult::failure("Snapshot name must not be empty");
        }
        if size.trim().is_empty() {
            return OperationResult::failure("Snapshot size must not be empty");
        }

        let args = vec![
            "-L".to_string(),
            size.trim().to_string(),
            "-s".to_string(),
            "-n".to_string(),
            snapshot.to_string(),
            device_path(vg_name, origin),
        ];
        self.invoke(LVCREATE, &args, || {
            format!("Snapshot '{snapshot}' of {vg_name}/{origin} created")
        })
    }

    /// Force-remove `vg_name/snapshot`.
    ///
    /// `lvremove -f` does not ask for confirmation; callers must.
    pub fn remove(&self, vg_name: &str, snapshot: &str) -> OperationResult {
        let args = vec!["-f".to_string(), device_path(vg_name, snapshot)];
        self.invoke(LVREMOVE, &args, || format!("Snapshot '{snapshot}' removed"))
    }

    /// Mount `vg_name/snapshot` at `mount_point`, creating the directory first.
    ///
    /// The mount point must be valid UTF-8 so `mount` sees the same path that
    /// was created.
    pub fn mount(&self, vg_name: &str, snapshot: &str, mount_point: &Path) -> OperationResult {
        let Some(target) = mount_point.to_str() else {
            warn!("Mount point {} is not valid UTF-8", mount_point.display());
            return OperationResult::failure(format!(
                "Mount point {} is not valid UTF-8",
                mount_point.display()
            ));
        };

        if let Err(e) = self.runner.create_dir_all(mount_point) {
            warn!("Failed to create mount point {}: {e}", mount_point.display());
            return OperationResult::failure(format!(
                "Failed to create mount point {}: {e}",
                mount_point.display()
            ));
        }

        let device = device_path(vg_name, snapshot);
        let args = vec![device.clone(), target.to_string()];
        self.invoke(MOUNT, &args, || {
            format!("{device} mounted at {}", mount_point.display())
        })
    }

    pub fn execute(&self, request: &LifecycleRequest) -> OperationResult {
        match request {
            LifecycleRequest::Create {
                vg_name,
                origin,
                snapshot,
                size,
            } => self.create(vg_name, origin, snapshot, size),
            LifecycleRequest::Remove { vg_name, snapshot } => self.remove(vg_name, snapshot),
            LifecycleRequest::Mount {
                vg_name,
                snapshot,
                mount_point,
            } => self.mount(vg_name, snapshot, mount_point),
        }
    }

    fn invoke(
        &self,
        program: &str,
        args: &[String],
        default_message: impl FnOnce() -> String,
    ) -> OperationResult {
        let rendered = render(program, args);
        info!("Running {rendered}");

        match self.runner.run(program, args) {
            Ok(output) if output.success() => {
                let stdout = output.stdout.trim();
                if stdout.is_empty() {
                    OperationResult::success(default_message())
                } else {
                    OperationResult::success(stdout)
                }
            }
            Ok(output) => {
                let message = output.diagnostic();
                warn!("{rendered} failed: {message}");
                OperationResult::failure(message)
            }
            Err(e) => {
                warn!("{rendered} could not run: {e}");
                OperationResult::failure(e.to_string())
            }
        }
    }
}
