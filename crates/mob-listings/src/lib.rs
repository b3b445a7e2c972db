//! User listings and the bundled catalog for Mobiliaria.
//!
//! - [`PropertyStore`] -- reactive, persisted collection of user listings with
//!   save/delete, a loading flag, and rollback on persistence failure
//! - [`Catalog`] -- the read-only dataset compiled into the binary
//! - [`PropertyStoreConfig`] -- storage key and simulated latencies

pub mod catalog;
pub mod config;
pub mod error;
pub mod store;

pub use catalog::Catalog;
pub use config::{PropertyStoreConfig, DEFAULT_LISTINGS_KEY};
pub use error::{FailureKind, ListingError, ListingResult};
pub use store::PropertyStore;
