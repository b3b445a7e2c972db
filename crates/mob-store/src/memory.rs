use std::collections::HashMap;
use std::sync::RwLock;

use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::traits::{entry_size, KeyValueStore, DEFAULT_QUOTA_BYTES};

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Values live behind a `RwLock` and are
/// cloned on read. The quota is enforced exactly like the file backend so
/// capacity failures can be exercised without touching disk.
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    quota: u64,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store with the default quota.
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    /// Create a new empty store holding at most `quota` bytes.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota,
        }
    }

    /// The configured capacity in bytes.
    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        let others: u64 = map
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum();
        let required = others + entry_size(key, value);
        if required > self.quota {
            warn!(key, required, quota = self.quota, "in-memory store quota exceeded");
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                required,
                quota: self.quota,
            });
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn usage(&self) -> StoreResult<u64> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.iter().map(|(k, v)| entry_size(k, v)).sum())
    }
}

impl std::fmt::Debug for InMemoryKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyValueStore")
            .field("key_count", &self.len())
            .field("quota", &self.quota)
            .finish()
    }
}
