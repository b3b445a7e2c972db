use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Storage key used for user listings.
pub const DEFAULT_LISTINGS_KEY: &str = "tu_mobiliaria_user_properties";

/// Configuration for the [`PropertyStore`](crate::PropertyStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyStoreConfig {
    /// Key the listing collection is persisted under.
    pub storage_key: String,
    /// Artificial delay before a save resolves, standing in for a network
    /// round-trip so the UI shows its spinner.
    pub save_latency_ms: u64,
    /// Artificial delay before a delete resolves.
    pub delete_latency_ms: u64,
}

impl Default for PropertyStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_LISTINGS_KEY.to_string(),
            save_latency_ms: 800,
            delete_latency_ms: 500,
        }
    }
}

impl PropertyStoreConfig {
    /// Same storage key, no artificial latency.
    pub fn immediate() -> Self {
        Self {
            save_latency_ms: 0,
            delete_latency_ms: 0,
            ..Default::default()
        }
    }

    pub fn save_latency(&self) -> Duration {
        Duration::from_millis(self.save_latency_ms)
    }

    pub fn delete_latency(&self) -> Duration {
        Duration::from_millis(self.delete_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = PropertyStoreConfig::default();
        assert_eq!(c.storage_key, "tu_mobiliaria_user_properties");
        assert_eq!(c.save_latency(), Duration::from_millis(800));
        assert_eq!(c.delete_latency(), Duration::from_millis(500));
    }

    #[test]
    fn immediate_keeps_key() {
        let c = PropertyStoreConfig::immediate();
        assert_eq!(c.storage_key, DEFAULT_LISTINGS_KEY);
        assert_eq!(c.save_latency(), Duration::ZERO);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: PropertyStoreConfig = serde_json::from_str(r#"{"save_latency_ms": 10}"#).unwrap();
        assert_eq!(c.save_latency_ms, 10);
        assert_eq!(c.delete_latency_ms, 500);
    }
}
