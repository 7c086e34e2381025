// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use thiserror::Error;

/// Error types for LVM tool invocations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("{command} is not available: {reason}")]
    ToolUnavailable { command: String, reason: String },

    #[error("{command} failed: {stderr}")]
    ToolFailed { command: String, stderr: String },

    #[error("{command} timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("another lifecycle operation is still running: {operation}")]
    Busy { operation: String },

    #[error("background worker exited without reporting a result")]
    WorkerLost,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for LVM operations
pub type Result<T> = std::result::Result<T, SysError>;
