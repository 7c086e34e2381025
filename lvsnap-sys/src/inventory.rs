// SPDX-License-Identifier: GPL-3.0-only

//! Logical volume discovery

use lvsnap_types::LogicalVolume;
use tracing::{debug, error};

use crate::command::{CommandRunner, render};
use crate::error::{Result, SysError};
use crate::parse::parse_inventory;

const LVS: &str = "lvs";

fn inventory_args() -> Vec<String> {
    ["--noheadings", "-o", "lv_name,vg_name,origin"]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

/// List every logical volume, flagging snapshots.
///
/// Order follows `lvs` output. A non-zero exit is a hard failure carrying
/// the tool's stderr.
pub fn list(runner: &dyn CommandRunner) -> Result<Vec<LogicalVolume>> {
    let args = inventory_args();
    let output = runner.run(LVS, &args)?;

    if !output.success() {
        let stderr = output.stderr.trim().to_string();
        error!("lvs failed: {stderr}");
        return Err(SysError::ToolFailed {
            command: render(LVS, &args),
            stderr,
        });
    }

    let volumes = parse_inventory(&output.stdout);
    debug!("Found {} logical volumes", volumes.len());
    Ok(volumes)
}
