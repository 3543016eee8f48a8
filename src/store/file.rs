//! JSON file backend for [`ConfigStore`].
//!
//! The file holds one flat object of strings:
//! ```json
//! {
//!   "hoursUntilRestart": "6",
//!   "serverEXE": "/srv/game/srcds_run",
//!   "serverParams": "+map lobby"
//! }
//! ```
//! Every `set` rewrites the whole file through a sibling temp file and a
//! rename, so a crash mid-write leaves either the old or the new document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::ConfigStore;

/// File-backed [`ConfigStore`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`; a missing file is an empty store.
    ///
    /// The file (and its parent directory) is created on the first `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(entries).map_err(|e| io_err(io::Error::other(e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("none.json")).unwrap();
        assert_eq!(store.get(keys::SERVER_EXE), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("user.json");

        let store = FileStore::open(&path).unwrap();
        store.set(keys::SERVER_EXE, "/srv/game/server").unwrap();
        store.set(keys::HOURS_UNTIL_RESTART, "6").unwrap();
        store.set(keys::HOURS_UNTIL_RESTART, "").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::SERVER_EXE).as_deref(), Some("/srv/game/server"));
        assert_eq!(reopened.get(keys::HOURS_UNTIL_RESTART).as_deref(), Some(""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert_eq!(err.as_label(), "store_parse");
    }

    #[test]
    fn test_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        fs::write(&path, "\n").unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("x"), None);
    }
}
