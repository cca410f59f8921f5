//! JSON file backed session storage.
//!
//! All keys live in one small JSON object. Every read goes to disk so that
//! another process sharing the profile sees the same session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::{KeyValueStore, StorageKey, StoreError};

/// Application name used for the data directory
const APP_NAME: &str = "autolot";

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

type Entries = BTreeMap<String, String>;

pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data dir>/autolot/session.json`.
    pub fn default_location() -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            StoreError::Unavailable("Could not find data directory".to_string())
        })?;
        Ok(Self::new(data_dir.join(APP_NAME).join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Current entries, or an empty map when the file is unreadable.
    /// A corrupt file gets overwritten by the next write.
    fn entries_or_empty(&self) -> Entries {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Entries::new()
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.entries_or_empty().remove(key.as_str())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.entries_or_empty();
        entries.insert(key.as_str().to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.entries_or_empty();
        if entries.remove(key.as_str()).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
