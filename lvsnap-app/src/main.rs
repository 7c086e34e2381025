// SPDX-License-Identifier: GPL-3.0-only

mod cli;
mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use lvsnap_sys::SnapshotManager;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::commands::Session;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load()?.with_overrides(cli.log_level, cli.timeout);
    logging::init(&config);
    debug!(?config, "configuration loaded");

    let manager = SnapshotManager::system(config.command_timeout(), Handle::current());

    let version = manager.probe_version();
    if let Some(warning) = version.as_ref().and_then(|v| v.compatibility_warning()) {
        warn!("{warning}");
    }

    let session = Session {
        manager: &manager,
        config: &config,
        json: cli.json,
        version,
    };
    commands::run(cli.command, &session).await
}
