//! File-backed key-value store.
//!
//! Each key is stored as `<key>.json` under a data directory. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! target, so a crash mid-write leaves the previous value intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{entry_size, validate_key, KeyValueStore, DEFAULT_QUOTA_BYTES};

const EXTENSION: &str = "json";

/// Durable key-value store rooted at a directory.
pub struct FileKeyValueStore {
    root: PathBuf,
    quota: u64,
    /// Serializes writers so the quota check and the rename are atomic
    /// with respect to each other.
    writer: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open (or create) a store at `root` with the default quota.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_quota(root, DEFAULT_QUOTA_BYTES)
    }

    /// Open (or create) a store at `root` holding at most `quota` bytes.
    pub fn with_quota(root: impl AsRef<Path>, quota: u64) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), quota, "opened file store");
        Ok(Self {
            root,
            quota,
            writer: Mutex::new(()),
        })
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured capacity in bytes.
    pub fn quota(&self) -> u64 {
        self.quota
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{EXTENSION}"))
    }

    /// `(key, size)` for every stored entry.
    fn entries(&self) -> StoreResult<Vec<(String, u64)>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.root)? {
            let dirent = dirent?;
            let path = dirent.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_key(key).is_err() {
                continue;
            }
            let len = dirent.metadata()?.len();
            entries.push((key.to_string(), key.len() as u64 + len));
        }
        Ok(entries)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let _guard = self.writer.lock().expect("writer lock poisoned");

        let others: u64 = self
            .entries()?
            .into_iter()
            .filter(|(k, _)| k != key)
            .map(|(_, size)| size)
            .sum();
        let required = others + entry_size(key, value);
        if required > self.quota {
            warn!(key, required, quota = self.quota, "file store quota exceeded");
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                required,
                quota: self.quota,
            });
        }

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| StoreError::Io(e.error))?;

        debug!(key, bytes = value.len(), "file store write");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let _guard = self.writer.lock().expect("writer lock poisoned");
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries()?.into_iter().map(|(k, _)| k).collect();
        keys.sort();
        Ok(keys)
    }

    fn usage(&self) -> StoreResult<u64> {
        Ok(self.entries()?.into_iter().map(|(_, size)| size).sum())
    }
}

impl std::fmt::Debug for FileKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeyValueStore")
            .field("root", &self.root)
            .field("quota", &self.quota)
            .finish()
    }
}
