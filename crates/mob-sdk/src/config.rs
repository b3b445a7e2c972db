use std::fs;
use std::path::{Path, PathBuf};

use mob_favorites::DEFAULT_FAVORITES_KEY;
use mob_listings::PropertyStoreConfig;
use mob_media::IngestConfig;
use mob_store::DEFAULT_QUOTA_BYTES;
use serde::{Deserialize, Serialize};

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration, usually read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted JSON blobs.
    pub data_dir: PathBuf,
    /// Storage capacity in bytes.
    pub quota_bytes: u64,
    /// Maximum log level: trace, debug, info, warn, or error.
    pub log_level: String,
    /// Key the favorite set is persisted under.
    pub favorites_key: String,
    pub listings: PropertyStoreConfig,
    pub images: IngestConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("mobiliaria-data"),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            log_level: "info".to_string(),
            favorites_key: DEFAULT_FAVORITES_KEY.to_string(),
            listings: PropertyStoreConfig::default(),
            images: IngestConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults with the data directory set.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }
}
