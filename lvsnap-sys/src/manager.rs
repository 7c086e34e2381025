// SPDX-License-Identifier: GPL-3.0-only

//! Facade consumed by presentation layers
//!
//! Reads run synchronously on the calling thread; lifecycle operations go
//! through the single-slot [`LifecycleExecutor`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lvsnap_types::{
    DetailedReport, LifecycleRequest, LogicalVolume, ParseOutcome, SelectionUsage, SnapshotUsage,
    VersionTuple, VolumeGroupCapacity,
};
use tokio::runtime::Handle;

use crate::capacity;
use crate::command::{CommandRunner, SystemRunner};
use crate::detail;
use crate::error::Result;
use crate::executor::{LifecycleExecutor, OperationHandle};
use crate::inventory;
use crate::lifecycle::SnapshotLifecycle;
use crate::tools;
use crate::version;

/// Entry point for everything the lvm2 tools can tell or do.
#[derive(Clone)]
pub struct SnapshotManager {
    runner: Arc<dyn CommandRunner>,
    executor: LifecycleExecutor,
}

impl SnapshotManager {
    /// `runtime` hosts the background worker for lifecycle operations.
    pub fn new(runner: Arc<dyn CommandRunner>, runtime: Handle) -> Self {
        let lifecycle = SnapshotLifecycle::new(Arc::clone(&runner));
        Self {
            runner,
            executor: LifecycleExecutor::new(lifecycle, runtime),
        }
    }

    /// Manager driving the real tools, killing any call that outlives `timeout`.
    pub fn system(timeout: Option<Duration>, runtime: Handle) -> Self {
        let runner = match timeout {
            Some(timeout) => SystemRunner::with_timeout(timeout),
            None => SystemRunner::new(),
        };
        Self::new(Arc::new(runner), runtime)
    }

    pub fn missing_tools(&self) -> Vec<&'static str> {
        tools::missing_tools()
    }

    pub fn probe_version(&self) -> Option<VersionTuple> {
        version::probe(self.runner.as_ref())
    }

    pub fn inventory(&self) -> Result<Vec<LogicalVolume>> {
        inventory::list(self.runner.as_ref())
    }

    pub fn usage(&self, volume: &LogicalVolume) -> ParseOutcome<SnapshotUsage> {
        capacity::snapshot_usage(self.runner.as_ref(), volume)
    }

    pub fn capacity(&self, vg_name: &str) -> ParseOutcome<VolumeGroupCapacity> {
        capacity::group_capacity(self.runner.as_ref(), vg_name)
    }

    pub fn selection_usage(&self, volume: &LogicalVolume) -> SelectionUsage {
        capacity::selection_usage(self.runner.as_ref(), volume)
    }

    pub fn details(&self) -> Result<DetailedReport> {
        detail::detailed_report(self.runner.as_ref())
    }

    pub fn create(
        &self,
        vg_name: &str,
        origin: &str,
        snapshot: &str,
        size: &str,
    ) -> Result<OperationHandle> {
        self.submit(LifecycleRequest::Create {
            vg_name: vg_name.to_string(),
            origin: origin.to_string(),
            snapshot: snapshot.to_string(),
            size: size.to_string(),
        })
    }

    /// Force-remove a snapshot. Ask the user before calling this.
    pub fn remove(&self, vg_name: &str, snapshot: &str) -> Result<OperationHandle> {
        self.submit(LifecycleRequest::Remove {
            vg_name: vg_name.to_string(),
            snapshot: snapshot.to_string(),
        })
    }

    pub fn mount(
        &self,
        vg_name: &str,
        snapshot: &str,
        mount_point: impl Into<PathBuf>,
    ) -> Result<OperationHandle> {
        self.submit(LifecycleRequest::Mount {
            vg_name: vg_name.to_string(),
            snapshot: snapshot.to_string(),
            mount_point: mount_point.into(),
        })
    }

    pub fn submit(&self, request: LifecycleRequest) -> Result<OperationHandle> {
        self.executor.run(request)
    }

    pub fn is_busy(&self) -> bool {
        self.executor.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;
    use crate::error::SysError;

    fn manager(runner: &Arc<FakeRunner>) -> SnapshotManager {
        SnapshotManager::new(runner.clone(), Handle::current())
    }

    #[tokio::test]
    async fn failed_create_leaves_reads_unchanged() {
        let runner = Arc::new(FakeRunner::new());
        let listing = "  root vg0\n  snap1 vg0 root\n";
        runner.respond("lvs", 0, listing, "");
        runner.respond("lvcreate", 5, "", "  Volume group \"vg0\" has insufficient free space.\n");
        runner.respond("lvs", 0, listing, "");
        let manager = manager(&runner);

        let before = manager.inventory().unwrap();
        let result = manager
            .create("vg0", "root", "snap2", "100G")
            .unwrap()
            .wait()
            .await
            .unwrap();
        let after = manager.inventory().unwrap();

        assert!(!result.ok);
        assert_eq!(result.message, "Volume group \"vg0\" has insufficient free space.");
        assert_eq!(before, after);
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|lv| lv.name != "snap2"));

        // One create attempt between the two listings: no retry, no cleanup lvremove.
        let programs: Vec<String> = runner.calls().into_iter().map(|call| call[0].clone()).collect();
        assert_eq!(programs, ["lvs", "lvcreate", "lvs"]);
        assert_eq!(
            runner.calls()[1],
            ["lvcreate", "-L", "100G", "-s", "-n", "snap2", "/dev/vg0/root"]
        );
    }

    #[tokio::test]
    async fn busy_manager_rejects_remove() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond("mount", 0, "", "");
        let (release, started) = runner.stall("mount");
        let manager = manager(&runner);

        let mount = manager.mount("vg0", "snap1", "/mnt/lvsnap/vg0/snap1").unwrap();
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(manager.is_busy());
        assert!(matches!(
            manager.remove("vg0", "snap1").unwrap_err(),
            SysError::Busy { .. }
        ));

        release.send(()).unwrap();
        assert!(mount.wait().await.unwrap().ok);
        assert!(!manager.is_busy());
        assert!(runner.calls().iter().all(|call| call[0] != "lvremove"));
    }

    #[tokio::test]
    async fn reads_use_shared_runner() {
        let runner = Arc::new(FakeRunner::new());
        runner.respond("lvm", 0, "  LVM version:     2.03.22(2) (2023-08-02)\n", "");
        runner.respond("vgs", 0, "  500.00 2000.00\n", "");
        let manager = manager(&runner);

        assert_eq!(manager.probe_version(), Some(VersionTuple(vec![2, 3, 22])));
        assert_eq!(
            manager.capacity("vg0"),
            ParseOutcome::Parsed(VolumeGroupCapacity {
                free_mb: 500.0,
                total_mb: 2000.0,
            })
        );
    }
}
