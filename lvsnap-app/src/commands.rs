// SPDX-License-Identifier: GPL-3.0-only

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use lvsnap_sys::{OperationHandle, SnapshotManager};
use lvsnap_types::{
    DetailedRecord, DetailedReport, LogicalVolume, OperationResult, ParseOutcome, SelectionUsage,
    VersionTuple,
};
use serde::Serialize;
use tracing::info;

use crate::cli::Command;
use crate::config::Config;

/// State shared by every subcommand.
pub(crate) struct Session<'a> {
    pub manager: &'a SnapshotManager,
    pub config: &'a Config,
    pub json: bool,
    /// Result of the startup probe
    pub version: Option<VersionTuple>,
}

#[derive(Serialize)]
struct VersionReport<'a> {
    version: Option<&'a VersionTuple>,
    tested: VersionTuple,
    warning: Option<String>,
}

#[derive(Serialize)]
struct ToolsReport<'a> {
    missing: &'a [&'static str],
}

pub(crate) async fn run(command: Command, session: &Session<'_>) -> anyhow::Result<ExitCode> {
    match command {
        Command::Version => version(session),
        Command::Tools => tools(session),
        Command::List => list(session),
        Command::Usage { vg_name, lv_name } => usage(session, &vg_name, &lv_name),
        Command::Capacity { vg_name } => capacity(session, vg_name),
        Command::Details { raw } => details(session, raw),
        Command::Create {
            vg_name,
            origin,
            name,
            size,
        } => {
            let size = size.unwrap_or_else(|| session.config.default_snapshot_size.clone());
            let handle = session.manager.create(&vg_name, &origin, &name, &size)?;
            finish(session, handle).await
        }
        Command::Remove { vg_name, name, yes } => {
            let volume = find_volume(session.manager, &vg_name, &name)?;
            if !volume.is_snapshot {
                bail!(
                    "{} is not a snapshot; only snapshots can be removed",
                    volume.display_name()
                );
            }
            if !yes && !confirm(&format!("Remove snapshot {}?", volume.display_name()))? {
                eprintln!("Aborted");
                return Ok(ExitCode::SUCCESS);
            }
            let handle = session.manager.remove(&vg_name, &name)?;
            finish(session, handle).await
        }
        Command::Mount {
            vg_name,
            name,
            mount_point,
        } => {
            let mount_point: PathBuf =
                mount_point.unwrap_or_else(|| session.config.mount_point_for(&vg_name, &name));
            let handle = session.manager.mount(&vg_name, &name, mount_point)?;
            finish(session, handle).await
        }
    }
}

fn version(session: &Session<'_>) -> anyhow::Result<ExitCode> {
    let warning = session
        .version
        .as_ref()
        .and_then(VersionTuple::compatibility_warning);

    if session.json {
        print_json(&VersionReport {
            version: session.version.as_ref(),
            tested: VersionTuple::tested(),
            warning,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    match &session.version {
        Some(version) => println!("LVM version {version}"),
        None => println!("LVM version: not detected"),
    }
    println!("Tested with {}", VersionTuple::tested());
    if let Some(warning) = warning {
        println!("{warning}");
    }
    Ok(ExitCode::SUCCESS)
}

fn tools(session: &Session<'_>) -> anyhow::Result<ExitCode> {
    let missing = session.manager.missing_tools();

    if session.json {
        print_json(&ToolsReport { missing: &missing })?;
    } else if missing.is_empty() {
        println!("All required tools found");
    } else {
        println!("Missing: {}", missing.join(", "));
    }

    Ok(if missing.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list(session: &Session<'_>) -> anyhow::Result<ExitCode> {
    let volumes = session.manager.inventory().context("list logical volumes")?;

    if session.json {
        print_json(&volumes)?;
    } else {
        for volume in &volumes {
            println!("{}", volume.label());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn usage(session: &Session<'_>, vg_name: &str, lv_name: &str) -> anyhow::Result<ExitCode> {
    let volume = find_volume(session.manager, vg_name, lv_name)?;
    let usage = session.manager.selection_usage(&volume);

    if session.json {
        print_json(&usage)?;
    } else {
        println!("{}", volume.label());
        println!("{}", usage.summary());
    }
    Ok(ExitCode::SUCCESS)
}

fn capacity(session: &Session<'_>, vg_name: String) -> anyhow::Result<ExitCode> {
    let capacity = session.manager.capacity(&vg_name);
    let usage = SelectionUsage::Group { vg_name, capacity };

    if session.json {
        print_json(&usage)?;
    } else {
        println!("{}", usage.summary());
    }
    Ok(ExitCode::SUCCESS)
}

fn details(session: &Session<'_>, raw: bool) -> anyhow::Result<ExitCode> {
    let report = session.manager.details().context("read detailed listing")?;

    if session.json {
        print_json(&report)?;
    } else if raw {
        print!("{}", report.raw);
    } else {
        for line in render_report(&report) {
            println!("{line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render_report(report: &DetailedReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<24} {:>10} {:<10} {:<16} {:>7} {:>7}  {}",
        "NAME", "SIZE(G)", "ATTR", "ORIGIN", "DATA%", "META%", "CREATED"
    )];

    for outcome in &report.records {
        match outcome {
            ParseOutcome::Parsed(record) => lines.push(render_record(record)),
            ParseOutcome::Malformed(raw) => lines.push(format!("!! unreadable row: {raw}")),
            ParseOutcome::Unknown => {}
        }
    }
    lines
}

fn render_record(record: &DetailedRecord) -> String {
    let created = record
        .created_at_parsed()
        .map(|created| created.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| or_dash(&record.created_at).to_string());

    format!(
        "{:<24} {:>10} {:<10} {:<16} {:>7} {:>7}  {}",
        record.name,
        record.size_gb,
        record.attr_flags,
        or_dash(&record.origin),
        or_dash(&record.data_percent),
        or_dash(&record.meta_percent),
        created
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn find_volume(
    manager: &SnapshotManager,
    vg_name: &str,
    lv_name: &str,
) -> anyhow::Result<LogicalVolume> {
    let volumes = manager.inventory().context("list logical volumes")?;
    match volumes
        .into_iter()
        .find(|volume| volume.vg_name == vg_name && volume.name == lv_name)
    {
        Some(volume) => Ok(volume),
        None => bail!("Logical volume {vg_name}/{lv_name} not found"),
    }
}

async fn finish(session: &Session<'_>, handle: OperationHandle) -> anyhow::Result<ExitCode> {
    let show_progress = !session.json && io::stderr().is_terminal();
    let result = wait_with_indicator(handle, show_progress).await?;

    if session.json {
        print_json(&result)?;
    } else if result.ok {
        println!("{}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
    }

    Ok(if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn wait_with_indicator(
    handle: OperationHandle,
    show_progress: bool,
) -> anyhow::Result<OperationResult> {
    let label = handle.request().to_string();
    info!("Waiting for {label}");

    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let wait = handle.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            result = &mut wait => {
                if show_progress {
                    eprint!("\r\x1b[2K");
                }
                return Ok(result?);
            }
            _ = ticker.tick() => {
                if show_progress {
                    eprint!("\r{label}: working... {}s", started.elapsed().as_secs());
                    let _ = io::stderr().flush();
                }
            }
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} This cannot be undone. [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serialize output")?
    );
    Ok(())
}
