use mob_store::StoreError;

/// Errors from favorites operations.
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    /// Writing the favorite set failed. The in-memory set is unchanged.
    #[error("failed to persist favorites: {0}")]
    Persist(#[from] StoreError),
}

impl FavoritesError {
    pub fn is_capacity(&self) -> bool {
        match self {
            Self::Persist(e) => e.is_capacity(),
        }
    }
}

/// Result alias for favorites operations.
pub type FavoritesResult<T> = Result<T, FavoritesError>;
