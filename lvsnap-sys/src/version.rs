// SPDX-License-Identifier: GPL-3.0-only

//! Toolchain version probe

use lvsnap_types::VersionTuple;
use tracing::{debug, warn};

use crate::command::CommandRunner;
use crate::parse::parse_version_report;

const LVM: &str = "lvm";

/// Ask `lvm version` which toolchain is installed.
///
/// A missing or broken toolchain is not an error at this point: the probe
/// just returns `None` and inventory will report the real failure later.
pub fn probe(runner: &dyn CommandRunner) -> Option<VersionTuple> {
    let output = match runner.run(LVM, &["version".to_string()]) {
        Ok(output) => output,
        Err(e) => {
            debug!("lvm version probe could not run: {e}");
            return None;
        }
    };

    if !output.success() {
        warn!(
            status = output.status,
            "lvm version exited non-zero: {}",
            output.diagnostic()
        );
        return None;
    }

    let version = parse_version_report(&output.stdout);
    match &version {
        Some(version) => debug!(%version, "detected lvm toolchain"),
        None => warn!("lvm version output has no LVM version line"),
    }
    version
}

#[cfg(test)]
mod tests {
    use super::probe;
    use crate::command::fake::FakeRunner;

    #[test]
    fn reads_version_from_report() {
        let runner = FakeRunner::new();
        runner.respond(
            "lvm",
            0,
            "  LVM version:     2.03.31(2) (2025-01-14)\n  Library version: 1.02.205\n",
            "",
        );

        let version = probe(&runner).unwrap();
        assert_eq!(version.0, vec![2, 3, 31]);
        assert!(version.is_newer_than_tested());
        assert_eq!(runner.calls(), vec![vec!["lvm".to_string(), "version".to_string()]]);
    }

    #[test]
    fn broken_toolchain_is_none() {
        let runner = FakeRunner::new();
        runner.respond("lvm", 3, "", "  /dev/mapper/control: open failed\n");
        assert!(probe(&runner).is_none());

        // Nothing scripted: the fake reports the tool as unavailable.
        assert!(probe(&runner).is_none());
    }
}
