// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: LoggingLevel,
    pub log_to_disk: bool,
    /// Kill tool invocations running longer than this; unset waits forever.
    pub command_timeout_secs: Option<u64>,
    pub default_snapshot_size: String,
    pub mount_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LoggingLevel::Info,
            log_to_disk: false,
            command_timeout_secs: None,
            default_snapshot_size: "1G".to_string(),
            mount_root: PathBuf::from("/mnt/lvsnap"),
        }
    }
}

impl Config {
    /// Load from the first location that is set: `$LVSNAP_CONFIG`,
    /// `$XDG_CONFIG_HOME/lvsnap/config.toml`, `~/.config/lvsnap/config.toml`.
    pub fn load() -> anyhow::Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        log_level: Option<LoggingLevel>,
        timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if timeout_secs.is_some() {
            self.command_timeout_secs = timeout_secs;
        }
        self
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// `<mount_root>/<vg>/<snapshot>`
    pub fn mount_point_for(&self, vg_name: &str, snapshot: &str) -> PathBuf {
        self.mount_root.join(vg_name).join(snapshot)
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("LVSNAP_CONFIG") {
        return Some(PathBuf::from(path));
    }

    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("lvsnap").join(CONFIG_FILE));
    }

    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("lvsnap")
            .join(CONFIG_FILE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"
            command_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, LoggingLevel::Debug);
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.default_snapshot_size, "1G");
        assert_eq!(config.mount_root, PathBuf::from("/mnt/lvsnap"));
        assert!(!config.log_to_disk);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "log_level = \"loud\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse config file"));
    }

    #[test]
    fn flags_override_file() {
        let config = Config {
            command_timeout_secs: Some(10),
            ..Config::default()
        }
        .with_overrides(Some(LoggingLevel::Trace), None);

        assert_eq!(config.log_level, LoggingLevel::Trace);
        assert_eq!(config.command_timeout_secs, Some(10));

        let config = config.with_overrides(None, Some(0));
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn mount_point_nests_group_and_snapshot() {
        let config = Config {
            mount_root: PathBuf::from("/srv/snaps"),
            ..Config::default()
        };
        assert_eq!(
            config.mount_point_for("vg0", "nightly"),
            PathBuf::from("/srv/snaps/vg0/nightly")
        );
    }
}
