//! Application facade for Mobiliaria.
//!
//! [`Mobiliaria`] is the single context a front end needs: it opens the
//! persistence backend, loads the bundled catalog, and owns the listing and
//! favorite stores, the mock session, and the image ingestor.
//!
//! # Design Rules
//!
//! 1. No globals. Every store is reached through a [`Mobiliaria`] value.
//! 2. State is observed through `watch` receivers handed out by the stores.
//! 3. Errors from every layer convert into [`SdkError`], which can render a
//!    user-facing message.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod telemetry;

pub use app::{Mobiliaria, IMAGES_FIELD};
pub use config::{AppConfig, ConfigError};
pub use error::{SdkError, SdkResult};
pub use routes::View;
pub use session::{SessionMock, User};
pub use telemetry::init_tracing;

// Re-export key types
pub use mob_favorites::FavoritesStore;
pub use mob_listings::{Catalog, PropertyStore, PropertyStoreConfig};
pub use mob_media::{DataUri, FileSource, ImageIngestor, ImageSource, IngestConfig, UploadedFile};
pub use mob_types::{CatalogListing, FavoriteListing, Listing, ListingDraft, ListingId};
