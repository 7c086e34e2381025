// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::LoggingLevel;

#[derive(Debug, Parser)]
#[command(name = "lvsnap")]
#[command(version, about = "Create, inspect and mount LVM snapshots")]
pub struct Cli {
    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Overrides `log_level` from the config file
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LoggingLevel>,

    /// Kill any LVM tool still running after this many seconds (0 disables)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the detected lvm2 version
    Version,
    /// Check that the required tools are on PATH
    Tools,
    /// List logical volumes
    List,
    /// Usage of a snapshot, or of the volume group for a plain volume
    Usage { vg_name: String, lv_name: String },
    /// Free and used space of a volume group
    Capacity { vg_name: String },
    /// Detailed attribute listing of every logical volume
    Details {
        /// Print the tool output as received
        #[arg(long)]
        raw: bool,
    },
    /// Snapshot an origin volume
    Create {
        vg_name: String,
        origin: String,
        name: String,
        /// Snapshot capacity, e.g. 100M, 1G, 10G
        #[arg(long, short = 'L')]
        size: Option<String>,
    },
    /// Remove a snapshot
    Remove {
        vg_name: String,
        name: String,
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Mount a snapshot, creating the mount point if needed
    Mount {
        vg_name: String,
        name: String,
        mount_point: Option<PathBuf>,
    },
}
