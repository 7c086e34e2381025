// SPDX-License-Identifier: GPL-3.0-only

mod common;

use std::sync::Arc;

use common::ScriptedRunner;
use lvsnap_sys::{SnapshotManager, SysError};
use lvsnap_types::{LogicalVolume, ParseOutcome, SelectionUsage};
use tokio::runtime::Handle;

const LISTING: &str = "  home   vg0\n  root   vg0\n  nightly vg0 root\n";

fn manager(runner: &Arc<ScriptedRunner>) -> SnapshotManager {
    SnapshotManager::new(runner.clone(), Handle::current())
}

#[tokio::test]
async fn refresh_then_inspect_selection() {
    let runner = Arc::new(ScriptedRunner::new());
    runner
        .ok("lvs", LISTING)
        .ok("lvs", "  nightly 1024,00 12,50\n")
        .ok("vgs", "  500.00 2000.00\n");
    let manager = manager(&runner);

    let volumes = manager.inventory().unwrap();
    let names: Vec<String> = volumes.iter().map(LogicalVolume::label).collect();
    assert_eq!(names, vec!["vg0/home", "vg0/root", "vg0/nightly [snapshot]"]);

    let snapshot = manager.selection_usage(&volumes[2]);
    assert_eq!(
        snapshot.summary(),
        "Snapshot Usage: 12.50% (128.0 MB / 1024.0 MB)"
    );

    let group = manager.selection_usage(&volumes[0]);
    assert!(matches!(group, SelectionUsage::Group { .. }));
    assert_eq!(
        group.summary(),
        "VG Usage: 75.00% (1500.0 MB used / 500.0 MB free / 2000.0 MB total)"
    );
}

#[tokio::test]
async fn failed_remove_leaves_usage_unchanged() {
    let runner = Arc::new(ScriptedRunner::new());
    runner
        .ok("lvs", "  nightly 1024.00 40.00\n")
        .fail("lvremove", 5, "  Logical volume vg0/nightly contains a filesystem in use.\n")
        .ok("lvs", "  nightly 1024.00 40.00\n");
    let manager = manager(&runner);
    let nightly = LogicalVolume::new("vg0", "nightly", true);

    let before = manager.usage(&nightly);
    let result = manager.remove("vg0", "nightly").unwrap().wait().await.unwrap();
    let after = manager.usage(&nightly);

    assert!(!result.ok);
    assert_eq!(
        result.message,
        "Logical volume vg0/nightly contains a filesystem in use."
    );
    assert!(before.is_parsed());
    assert_eq!(before, after);

    // A refused removal is reported once; nothing retries it or runs anything else.
    let usage = "lvs --noheadings -o lv_name,lv_size,data_percent --units m --nosuffix /dev/vg0/nightly";
    assert_eq!(
        runner.calls(),
        [usage, "lvremove -f /dev/vg0/nightly", usage]
    );
}

#[tokio::test]
async fn mount_creates_nested_directory() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("vg0").join("nightly");
    let runner = Arc::new(ScriptedRunner::new());
    runner.ok("mount", "");
    let manager = manager(&runner);

    let result = manager
        .mount("vg0", "nightly", &target)
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(result.ok, "{}", result.message);
    assert!(target.is_dir());
    assert_eq!(
        runner.calls(),
        vec![format!("mount /dev/vg0/nightly {}", target.display())]
    );
}

#[tokio::test]
async fn inventory_failure_is_hard_error() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.fail("lvs", 5, "  WARNING: Running as a non-root user.\n");
    let manager = manager(&runner);

    match manager.inventory().unwrap_err() {
        SysError::ToolFailed { command, stderr } => {
            assert!(command.starts_with("lvs --noheadings"));
            assert_eq!(stderr, "WARNING: Running as a non-root user.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_toolchain_degrades_reads() {
    let runner = Arc::new(ScriptedRunner::new());
    let manager = manager(&runner);

    assert_eq!(manager.probe_version(), None);
    assert_eq!(manager.capacity("vg0"), ParseOutcome::Unknown);
    assert!(matches!(
        manager.inventory().unwrap_err(),
        SysError::ToolUnavailable { .. }
    ));
}

#[tokio::test]
async fn detailed_report_serializes_outcomes() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.ok(
        "lvs",
        "  root,/dev/vg0/root,20,00,-wi-ao----,,,2024-03-05 14:07:09 +0100\n  bogus,row\n",
    );
    let manager = manager(&runner);

    let report = manager.details().unwrap();
    assert_eq!(report.parsed().count(), 1);
    assert_eq!(report.malformed().collect::<Vec<_>>(), vec!["bogus,row"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records"][0]["status"], "parsed");
    assert_eq!(json["records"][0]["value"]["size_gb"], "20,00");
    assert_eq!(json["records"][1]["status"], "malformed");
}
