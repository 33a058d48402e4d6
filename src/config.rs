//! User configuration loaded from `config.toml`.

use crate::format::DEFAULT_PRECISION;
use crate::notify::{DEFAULT_TOAST_DURATION, Notification};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fractional digits shown in results.
    pub precision: usize,
    /// Maximum number of history entries kept. 0 disables history.
    pub history_limit: usize,
    /// Show thousands separators.
    pub grouped: bool,
    /// How long notifications stay visible, in milliseconds.
    pub toast_duration_ms: u64,
    /// Override for the storage file location.
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            history_limit: 50,
            grouped: false,
            toast_duration_ms: DEFAULT_TOAST_DURATION.as_millis() as u64,
            storage_path: None,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/calckit/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when there
    /// is no config directory or no file.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file is not an error; a malformed one is.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        Self::parse(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    /// Apply the configured toast duration to `notification`.
    pub fn toast(&self, notification: Notification) -> Notification {
        notification.with_duration(self.toast_duration())
    }

    /// Configured storage path, or the platform default.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(crate::storage::Storage::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.precision, 6);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.toast_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("precision = 2\ngrouped = true\n").unwrap();
        assert_eq!(config.precision, 2);
        assert!(config.grouped);
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::parse("precison = 2").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "precision = \"six\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid config"));
    }

    #[test]
    fn test_toast_duration_applies_to_notifications() {
        let config = Config::parse("toast_duration_ms = 500").unwrap();
        let toast = config.toast(Notification::success("= 4"));
        assert_eq!(toast.duration, Duration::from_millis(500));
        assert_eq!(toast.message, "= 4");

        let default = Config::default().toast(Notification::error("nope"));
        assert_eq!(default.duration, DEFAULT_TOAST_DURATION);
    }

    #[test]
    fn test_storage_path_override() {
        let config = Config::parse("storage_path = \"/tmp/calc.json\"").unwrap();
        assert_eq!(config.storage_path(), Some(PathBuf::from("/tmp/calc.json")));
    }
}
