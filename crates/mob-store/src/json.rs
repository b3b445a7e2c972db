//! JSON encoding on top of a [`KeyValueStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// Read and decode the JSON value under `key`.
///
/// Returns `Ok(None)` if the key is absent and [`StoreError::Corrupt`] if the
/// stored text is not valid JSON for `T`. Callers decide whether corruption
/// is fatal.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StoreResult<Option<T>> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Encode `value` as JSON and store it under `key`.
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> StoreResult<()> {
    let encoded =
        serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    debug!(key, bytes = encoded.len(), "writing JSON value");
    store.write(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyValueStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u64,
        title: String,
    }

    #[test]
    fn write_then_read() {
        let store = InMemoryKeyValueStore::new();
        let entries = vec![Entry { id: 1, title: "Casa".into() }];
        write_json(&store, "entries", &entries).unwrap();

        let back: Vec<Entry> = read_json(&store, "entries").unwrap().unwrap();
        assert_eq!(back, entries);
        assert_eq!(
            store.read("entries").unwrap().unwrap(),
            r#"[{"id":1,"title":"Casa"}]"#
        );
    }

    #[test]
    fn missing_key_is_none() {
        let store = InMemoryKeyValueStore::new();
        let value: Option<Vec<Entry>> = read_json(&store, "entries").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let store = InMemoryKeyValueStore::new();
        store.write("entries", "[{not json").unwrap();
        let err = read_json::<Vec<Entry>>(&store, "entries").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "entries"));
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let store = InMemoryKeyValueStore::new();
        store.write("entries", r#"{"id": 1}"#).unwrap();
        assert!(matches!(
            read_json::<Vec<Entry>>(&store, "entries"),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
