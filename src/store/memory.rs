use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::store::ConfigStore;

/// In-memory [`ConfigStore`]; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
