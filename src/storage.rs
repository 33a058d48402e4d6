//! Local key/value persistence.
//!
//! Values are stored as JSON inside a single JSON object file. None of the
//! public methods fail: faults are logged and reported through a `bool`
//! (writes) or by falling back to the caller's default (reads).

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORAGE_FILE: &str = "storage.json";

/// A JSON-file backed key/value store.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_DATA_HOME/calckit/storage.json`, if a data directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(crate::APP_NAME).join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `value` under `key`. Returns `false` if it could not be written.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let result = (|| -> Result<()> {
            let value = serde_json::to_value(value).context("Failed to serialize value")?;
            let mut map = self.read_all()?;
            map.insert(key.to_string(), value);
            self.write_all(&map)
        })();
        self.report("save", key, result)
    }

    /// Read the value under `key`, or `default` if it is missing or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let result = (|| -> Result<Option<T>> {
            let mut map = self.read_all()?;
            match map.remove(key) {
                Some(value) => {
                    let parsed = serde_json::from_value(value)
                        .with_context(|| format!("Stored value for '{key}' has the wrong shape"))?;
                    Ok(Some(parsed))
                }
                None => Ok(None),
            }
        })();

        match result {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key, "No stored value, using default");
                default
            }
            Err(e) => {
                warn!(key, error = %format!("{e:#}"), "Failed to load stored value");
                default
            }
        }
    }

    /// Delete `key`. Removing a missing key succeeds.
    pub fn remove(&self, key: &str) -> bool {
        let result = (|| -> Result<()> {
            let mut map = self.read_all()?;
            if map.remove(key).is_some() {
                self.write_all(&map)?;
            }
            Ok(())
        })();
        self.report("remove", key, result)
    }

    /// Delete every stored value.
    pub fn clear(&self) -> bool {
        let result = match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        };
        self.report("clear", "*", result)
    }

    fn report(&self, op: &str, key: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(op, key, error = %format!("{e:#}"), "Storage operation failed");
                false
            }
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Write through a sibling temp file so a crash never leaves half a file.
    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(map).context("Failed to serialize storage")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("nested").join(STORAGE_FILE));
        (dir, storage)
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, storage) = storage();
        assert!(storage.save("last", "1+2"));
        assert!(storage.save("precision", &4));
        assert_eq!(storage.load("last", String::new()), "1+2");
        assert_eq!(storage.load("precision", 6), 4);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let (_dir, storage) = storage();
        assert_eq!(storage.load("missing", 42), 42);
    }

    #[test]
    fn test_load_wrong_shape_returns_default() {
        let (_dir, storage) = storage();
        assert!(storage.save("value", "not a number"));
        assert_eq!(storage.load("value", 7u32), 7);
    }

    #[test]
    fn test_corrupt_file_is_not_fatal() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{ not json").unwrap();

        assert_eq!(storage.load("key", 1), 1);
        assert!(!storage.save("key", &2));
        assert!(!storage.remove("key"));
        assert!(storage.clear());
        assert!(storage.save("key", &2));
        assert_eq!(storage.load("key", 1), 2);
    }

    #[test]
    fn test_remove() {
        let (_dir, storage) = storage();
        assert!(storage.save("a", &1));
        assert!(storage.save("b", &2));
        assert!(storage.remove("a"));
        assert!(storage.remove("never-existed"));
        assert_eq!(storage.load("a", 0), 0);
        assert_eq!(storage.load("b", 0), 2);
    }

    #[test]
    fn test_clear() {
        let (_dir, storage) = storage();
        assert!(storage.clear());
        assert!(storage.save("a", &1));
        assert!(storage.clear());
        assert_eq!(storage.load("a", 0), 0);
    }
}
