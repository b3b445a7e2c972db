use std::io;

/// Errors from the image ingestion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source could not be read.
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The bytes are not a decodable image.
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Re-encoding the resized image failed.
    #[error("failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// The blocking worker panicked or was cancelled.
    #[error("image worker failed: {0}")]
    Worker(String),

    /// A string that was expected to be a data URI is not one.
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
}

impl IngestError {
    /// Returns `true` if the input was unreadable or not an image.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Decode { .. })
    }
}

/// Result alias for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;
