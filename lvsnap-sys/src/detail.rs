// SPDX-License-Identifier: GPL-3.0-only

use lvsnap_types::DetailedReport;
use tracing::{debug, error, warn};

use crate::command::{CommandRunner, render};
use crate::error::{Result, SysError};
use crate::parse::parse_detailed;

const LVS: &str = "lvs";

/// Columns requested for the detailed view, in [`lvsnap_types::DetailedRecord`] order.
pub const DETAILED_COLUMNS: &str =
    "lv_name,lv_path,lv_size,lv_attr,origin,data_percent,metadata_percent,lv_time";

fn detailed_args() -> Vec<String> {
    [
        "--noheadings",
        "--units",
        "g",
        "--nosuffix",
        "--separator",
        ",",
        "-o",
        DETAILED_COLUMNS,
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

/// Detailed attribute listing of every logical volume.
///
/// Rows go through the comma repair in [`crate::parse::repair_detailed_fields`];
/// rows it cannot align are kept as `Malformed` next to the raw text.
pub fn detailed_report(runner: &dyn CommandRunner) -> Result<DetailedReport> {
    let args = detailed_args();
    let output = runner.run(LVS, &args)?;

    if !output.success() {
        let stderr = output.stderr.trim().to_string();
        error!("lvs detailed listing failed: {stderr}");
        return Err(SysError::ToolFailed {
            command: render(LVS, &args),
            stderr,
        });
    }

    let report = DetailedReport {
        records: parse_detailed(&output.stdout),
        raw: output.stdout,
    };

    let malformed = report.malformed().count();
    if malformed > 0 {
        warn!("{malformed} detailed rows could not be aligned");
    }
    debug!("Parsed {} detailed rows", report.records.len());
    Ok(report)
}
