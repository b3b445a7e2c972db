use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] mob_store::StoreError),

    #[error("listing error: {0}")]
    Listing(#[from] mob_listings::ListingError),

    #[error("favorites error: {0}")]
    Favorites(#[from] mob_favorites::FavoritesError),

    #[error("image error: {0}")]
    Ingest(#[from] mob_media::IngestError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl SdkError {
    /// Returns `true` if local storage ran out of space.
    pub fn is_capacity(&self) -> bool {
        match self {
            Self::Store(e) => e.is_capacity(),
            Self::Listing(e) => e.is_capacity(),
            Self::Favorites(e) => e.is_capacity(),
            Self::Ingest(_) | Self::Config(_) => false,
        }
    }

    /// Text suitable for an alert shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Listing(e) => e.user_message(),
            Self::Ingest(e) if e.is_bad_input() => {
                "One of the photos could not be read. Try a different image."
            }
            _ if self.is_capacity() => {
                "There is not enough local storage space. Remove some listings or photos and try again."
            }
            _ => "Something went wrong. Please try again.",
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
