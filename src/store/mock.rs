use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::errors::StoreError;
use crate::store::Store;

/// An in-memory store that counts writes and can be given a quota.
#[derive(Debug, Default)]
pub struct MockStore {
    map: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    writes: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes whose total size, keys
    /// included, would exceed `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        MockStore {
            quota: Some(quota),
            ..Default::default()
        }
    }

    /// Creates a store already holding the given value.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .map
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());

        store
    }

    /// The number of successful calls to `set_item`.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Store for MockStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());

        Ok(map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());

        if let Some(quota) = self.quota {
            let others: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();

            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        map.insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.map
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);

        Ok(())
    }
}
