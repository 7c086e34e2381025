// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot usage and volume group capacity
//!
//! Capacity figures are best effort: any failure to run or read the tools
//! ends up as `ParseOutcome::Unknown`/`Malformed`, never as an error.

use lvsnap_types::{LogicalVolume, ParseOutcome, SelectionUsage, SnapshotUsage, VolumeGroupCapacity};
use tracing::{debug, warn};

use crate::command::{CommandOutput, CommandRunner};
use crate::parse::{parse_snapshot_info, parse_vg_capacity};

const LVS: &str = "lvs";
const VGS: &str = "vgs";

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

fn run_best_effort(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> Option<CommandOutput> {
    match runner.run(program, args) {
        Ok(output) if output.success() => Some(output),
        Ok(output) => {
            warn!("{program} failed: {}", output.diagnostic());
            None
        }
        Err(e) => {
            warn!("{program} could not run: {e}");
            None
        }
    }
}

/// Copy-on-write usage of a snapshot.
///
/// Returns `Unknown` without running anything when `volume` is not a snapshot.
pub fn snapshot_usage(
    runner: &dyn CommandRunner,
    volume: &LogicalVolume,
) -> ParseOutcome<SnapshotUsage> {
    if !volume.is_snapshot {
        return ParseOutcome::Unknown;
    }

    let device = volume.device_path();
    let args = to_args(&[
        "--noheadings",
        "-o",
        "lv_name,lv_size,data_percent",
        "--units",
        "m",
        "--nosuffix",
        device.as_str(),
    ]);

    let Some(output) = run_best_effort(runner, LVS, &args) else {
        return ParseOutcome::Unknown;
    };

    let usage = parse_snapshot_info(&output.stdout, &volume.name);
    debug!(volume = %volume.display_name(), ?usage, "snapshot usage");
    usage
}

/// Free and total space of a volume group.
pub fn group_capacity(
    runner: &dyn CommandRunner,
    vg_name: &str,
) -> ParseOutcome<VolumeGroupCapacity> {
    let args = to_args(&[
        "--noheadings",
        "-o",
        "vg_free,vg_size",
        "--units",
        "m",
        "--nosuffix",
        vg_name,
    ]);

    let Some(output) = run_best_effort(runner, VGS, &args) else {
        return ParseOutcome::Unknown;
    };

    let capacity = parse_vg_capacity(&output.stdout);
    debug!(vg_name, ?capacity, "volume group capacity");
    capacity
}

/// Usage figure for a selected volume: its own for a snapshot, its
/// group's for anything else.
pub fn selection_usage(runner: &dyn CommandRunner, volume: &LogicalVolume) -> SelectionUsage {
    if volume.is_snapshot {
        SelectionUsage::Snapshot {
            usage: snapshot_usage(runner, volume),
        }
    } else {
        SelectionUsage::Group {
            vg_name: volume.vg_name.clone(),
            capacity: group_capacity(runner, &volume.vg_name),
        }
    }
}
