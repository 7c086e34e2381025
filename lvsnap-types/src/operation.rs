// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot lifecycle requests and their results

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A create/remove/mount call, as handed to the background executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum LifecycleRequest {
    Create {
        vg_name: String,
        origin: String,
        snapshot: String,
        /// Capacity with unit suffix, passed to `lvcreate -L` verbatim (e.g. `1G`)
        size: String,
    },
    Remove {
        vg_name: String,
        snapshot: String,
    },
    Mount {
        vg_name: String,
        snapshot: String,
        mount_point: PathBuf,
    },
}

impl LifecycleRequest {
    /// Volume the request acts on, as `vg/lv`.
    pub fn target(&self) -> String {
        match self {
            LifecycleRequest::Create {
                vg_name, snapshot, ..
            }
            | LifecycleRequest::Remove { vg_name, snapshot }
            | LifecycleRequest::Mount {
                vg_name, snapshot, ..
            } => format!("{vg_name}/{snapshot}"),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleRequest::Create { .. } => "create",
            LifecycleRequest::Remove { .. } => "remove",
            LifecycleRequest::Mount { .. } => "mount",
        }
    }
}

impl fmt::Display for LifecycleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.target())
    }
}

/// Result of one lifecycle operation
///
/// On failure `message` is the tool's own stderr, untouched apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub ok: bool,
    pub message: String,
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_request_target() {
        let request = LifecycleRequest::Create {
            vg_name: "vg0".into(),
            origin: "root".into(),
            snapshot: "root-snap".into(),
            size: "1G".into(),
        };
        assert_eq!(request.target(), "vg0/root-snap");
        assert_eq!(request.to_string(), "create vg0/root-snap");

        let request = LifecycleRequest::Mount {
            vg_name: "vg0".into(),
            snapshot: "root-snap".into(),
            mount_point: PathBuf::from("/mnt/snap"),
        };
        assert_eq!(request.kind(), "mount");
    }
}
