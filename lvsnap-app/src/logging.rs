// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "lvsnap.log";
const RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so `--json` output on stdout stays clean.
pub(crate) fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new("warn");
        for target in ["lvsnap", "lvsnap_sys"] {
            if let Ok(directive) = format!("{target}={}", config.log_level.as_directive()).parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    if !config.log_to_disk {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return;
    }

    match file_writer() {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();

            // Keep the background logging worker alive for the duration of the process.
            let _ = LOG_GUARD.set(guard);
        }
        Err(e) => {
            eprintln!("lvsnap: failed to initialize file logging: {e:#}");
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
        }
    }
}

fn file_writer() -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    let dir = log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    prune_logs(&dir, SystemTime::now());
    Ok(tracing_appender::non_blocking(
        tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX),
    ))
}

/// `$LVSNAP_LOG_DIR`, else `lvsnap/logs` under the XDG state directory.
fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("LVSNAP_LOG_DIR") {
        return PathBuf::from(dir);
    }

    let state_home = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".local/state")))
        .unwrap_or_else(std::env::temp_dir);
    state_home.join("lvsnap").join("logs")
}

/// Delete rotated log files last written before `now - RETENTION`.
fn prune_logs(dir: &Path, now: SystemTime) {
    let Some(cutoff) = now.checked_sub(RETENTION) else {
        return;
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    entries
        .flatten()
        .filter(|entry| is_rotated_log(&entry.file_name()))
        .filter(|entry| last_written(entry).is_some_and(|written| written < cutoff))
        .for_each(|entry| {
            if let Err(e) = fs::remove_file(entry.path()) {
                tracing::debug!(path = %entry.path().display(), "keeping old log file: {e}");
            }
        });
}

fn is_rotated_log(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
}

fn last_written(entry: &fs::DirEntry) -> Option<SystemTime> {
    let metadata = entry.metadata().ok()?;
    metadata.is_file().then(|| metadata.modified().ok()).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_only_removes_expired_rotated_logs() {
        let dir = tempfile::tempdir().unwrap();
        let rotated = dir.path().join("lvsnap.log.2024-01-01");
        let unrelated = dir.path().join("notes.txt");
        let nested = dir.path().join("lvsnap.log.d");
        fs::write(&rotated, "old").unwrap();
        fs::write(&unrelated, "keep").unwrap();
        fs::create_dir(&nested).unwrap();

        prune_logs(dir.path(), SystemTime::now());
        assert!(rotated.exists());

        let later = SystemTime::now() + RETENTION + Duration::from_secs(24 * 60 * 60);
        prune_logs(dir.path(), later);
        assert!(!rotated.exists());
        assert!(unrelated.exists());
        assert!(nested.exists());
    }

    #[test]
    fn prune_tolerates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        prune_logs(&dir.path().join("absent"), SystemTime::now());
    }

    #[test]
    fn rotated_log_names() {
        assert!(is_rotated_log(OsStr::new("lvsnap.log")));
        assert!(is_rotated_log(OsStr::new("lvsnap.log.2026-10-16")));
        assert!(!is_rotated_log(OsStr::new("other.log.2026-10-16")));
    }
}
