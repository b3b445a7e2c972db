use crate::error::{StoreError, StoreResult};

/// Capacity of browser local storage in most engines: 5 MiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Synchronous string key-value store.
///
/// All implementations must satisfy these invariants:
/// - `write` either fully replaces the value or leaves the previous value
///   readable. There is no partial-write state.
/// - A write that would push [`usage`](Self::usage) past the quota fails with
///   [`StoreError::QuotaExceeded`] before anything changes.
/// - Reads of a missing key return `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns `true` if it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;

    /// All stored keys, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Bytes currently in use, counting both keys and values.
    fn usage(&self) -> StoreResult<u64>;

    /// Returns `true` if `key` holds a value.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read(key)?.is_some())
    }
}

/// Reject keys that cannot be used as a file stem on every platform.
///
/// Allowed: ASCII letters, digits, `_`, `-` and `.`, not starting with `.`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Footprint of one entry as charged against the quota.
pub(crate) fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}
