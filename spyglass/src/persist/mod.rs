//! Persisted console state
//!
//! A small string key/value store for state that should survive restarts,
//! currently the event filter selection. Backed by one JSON document on
//! disk; hosts that pass no state path get a process-lifetime memory store
//! with the same interface.
//!
//! Persistence is best-effort by contract: a failed write is logged at debug
//! and the in-memory value stands. No interaction path ever fails because a
//! disk write did.

use crate::domain::PersistError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key the event filter selection is stored under.
pub const FILTER_KEY: &str = "event_filter";

/// Key the list/detail pane split percentage is stored under.
pub const SPLIT_KEY: &str = "pane_split";

/// String key/value persistence capability.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ============================================================================
// Memory store
// ============================================================================

/// Process-lifetime store, the fallback when no state path is configured.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

// ============================================================================
// File store
// ============================================================================

/// Write-through store over a single JSON object file.
///
/// The whole document is rewritten on every mutation; the store is for a
/// handful of small strings, not a database.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading any existing document. A missing file is an
    /// empty store; a file holding something other than a JSON object of
    /// strings is an error.
    pub fn open(path: &Path) -> Result<Self, PersistError> {
        let values = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            let document: serde_json::Value = serde_json::from_str(&text)?;
            if !document.is_object() {
                return Err(PersistError::NotAnObject(path.display().to_string()));
            }
            serde_json::from_value(document)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: RefCell::new(values),
        })
    }

    fn write_through(&self) {
        if let Err(err) = self.try_write() {
            log::debug!("state write to {} failed: {err}", self.path.display());
        }
    }

    fn try_write(&self) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(&*self.values.borrow())?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.write_through();
    }

    fn remove(&self, key: &str) {
        if self.values.borrow_mut().remove(key).is_some() {
            self.write_through();
        }
    }
}

/// Open the configured store, falling back to memory when the file cannot
/// be used. The console always gets a working store out of this.
pub fn open_state_store(path: Option<&Path>) -> Rc<dyn StateStore> {
    match path {
        Some(path) => match FileStore::open(path) {
            Ok(store) => Rc::new(store),
            Err(err) => {
                log::warn!(
                    "cannot use state file {}: {err}; keeping state in memory",
                    path.display()
                );
                Rc::new(MemoryStore::new())
            }
        },
        None => Rc::new(MemoryStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing"), None);
        store.set("filter", "{}");
        assert_eq!(store.get("filter").as_deref(), Some("{}"));
        store.remove("filter");
        assert_eq!(store.get("filter"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set(FILTER_KEY, r#"{"levels":["Error"]}"#);
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(FILTER_KEY).as_deref(),
            Some(r#"{"levels":["Error"]}"#)
        );
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, PersistError::NotAnObject(_)));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(&dir.path().join("fresh.json")).unwrap();
        assert_eq!(store.get(FILTER_KEY), None);
    }

    #[test]
    fn test_unusable_path_falls_back_to_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = open_state_store(Some(&path));
        store.set("key", "value");
        assert_eq!(store.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_failed_write_keeps_value_in_memory() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(&dir.path().join("state.json")).unwrap();
        // Make the directory disappear under the store.
        drop(dir);
        store.set("key", "value");
        assert_eq!(store.get("key").as_deref(), Some("value"));
    }
}
