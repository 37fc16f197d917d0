//! Durable key-value storage for persisted state.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::warn;

use super::error::StoreError;

/// Key under which saved selections are stored.
pub const SAVED_SELECTIONS_KEY: &str = "mvv.savedSelections";

/// Synchronous get/set of JSON strings under string keys.
pub trait KeyValueStore: Send + Sync {
    /// The stored value, or `None` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// Values must themselves be JSON; they are embedded in the file as JSON
/// rather than as escaped strings, so the file stays readable.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. A missing file is an empty store.
    fn read_all(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };
        serde_json::from_str(&contents).map_err(|e| StoreError::Json {
            message: format!("failed to parse {}: {}", self.path.display(), e),
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                message: format!("failed to create store directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Json {
            message: format!("failed to serialize store: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| StoreError::Io {
            message: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.get(key).map(Value::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let value: Value = serde_json::from_str(value).map_err(|e| StoreError::Json {
            message: format!("value for {key} is not JSON: {e}"),
        })?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Json { message }) => {
                warn!(%message, "store file is corrupt, overwriting");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }
}
