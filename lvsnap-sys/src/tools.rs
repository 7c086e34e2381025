// SPDX-License-Identifier: GPL-3.0-only

//! Toolchain presence check

use tracing::{debug, warn};

/// External programs the manager shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["lvm", "lvs", "vgs", "lvcreate", "lvremove", "mount"];

/// Names from [`REQUIRED_TOOLS`] that cannot be found on `PATH`.
pub fn missing_tools() -> Vec<&'static str> {
    missing_from(REQUIRED_TOOLS)
}

fn missing_from(tools: &[&'static str]) -> Vec<&'static str> {
    let missing: Vec<&'static str> = tools
        .iter()
        .copied()
        .filter(|tool| which::which(tool).is_err())
        .collect();

    if missing.is_empty() {
        debug!("All LVM tools found on PATH");
    } else {
        warn!("Missing tools: {:?}", missing);
    }
    missing
}
