use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

use super::ClientStore;
use crate::errors::{Error, Result};

const CURRENT_VERSION: u32 = 1;

/// Default file name inside the data directory.
pub const STORE_FILE_NAME: &str = "client-store.json";

/// JSON file holding all client entries.
///
/// Every write rewrites the whole file through a temporary sibling so a
/// crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct FileClientStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Serialize, Deserialize, Default)]
struct StoreFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

impl FileClientStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/client-store.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_entries<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("Client store lock poisoned".into()))?;
        let mut entries = self.load_locked()?;
        if op(&mut entries) {
            self.persist_locked(entries)?;
        }
        Ok(())
    }

    fn load_locked(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_slice::<StoreFile>(&raw) {
            Ok(file) => Ok(file.entries),
            Err(e) => {
                warn!(
                    "[FileClientStore] {} is unreadable, starting empty: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn persist_locked(&self, entries: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = StoreFile {
            version: CURRENT_VERSION,
            entries,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ClientStore for FileClientStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("Client store lock poisoned".into()))?;
        Ok(self.load_locked()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let store = FileClientStore::in_dir(dir.path());
        store.set_item("ownsphere.session.userId", "alice").unwrap();

        let reopened = FileClientStore::in_dir(dir.path());
        assert_eq!(
            reopened.get_item("ownsphere.session.userId").unwrap(),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_remove_item() {
        let dir = tempdir().unwrap();
        let store = FileClientStore::in_dir(dir.path());
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();

        store.remove_item("a").unwrap();
        store.remove_item("missing").unwrap();

        assert_eq!(store.get_item("a").unwrap(), None);
        assert_eq!(store.get_item("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = FileClientStore::new(dir.path().join("nested/store.json"));
        assert_eq!(store.get_item("anything").unwrap(), None);

        store.set_item("k", "v").unwrap();
        assert!(dir.path().join("nested/store.json").exists());
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "not json at all").unwrap();

        let store = FileClientStore::new(path);
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_format_is_versioned() {
        let dir = tempdir().unwrap();
        let store = FileClientStore::in_dir(dir.path());
        store.set_item("k", "v").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["entries"]["k"], "v");
    }
}
