/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing the value would exceed the store's capacity.
    #[error("storage quota exceeded writing {key}: {required} bytes required, {quota} bytes allowed")]
    QuotaExceeded {
        key: String,
        required: u64,
        quota: u64,
    },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The stored value could not be decoded.
    #[error("corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Serialization failure on write.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend is disabled or otherwise unavailable.
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` if the failure is a capacity problem the user can only
    /// fix by storing less data.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
