//! Image ingestion for Mobiliaria.
//!
//! Uploaded photos are stored inline with their listing, so they have to be
//! small. The pipeline reads an [`ImageSource`], decodes it, fits the longer
//! side within a cap (1200 px by default), re-encodes it as JPEG at quality
//! 70, and returns a [`DataUri`] ready to be stored as a string.

pub mod data_uri;
pub mod error;
pub mod pipeline;
pub mod source;

pub use data_uri::DataUri;
pub use error::{IngestError, IngestResult};
pub use pipeline::{fit_dimensions, ImageIngestor, IngestConfig, IngestMode};
pub use source::{FileSource, ImageSource, UploadedFile};
