//! Favorites for Mobiliaria.
//!
//! The favorite set is a list of bare [`ListingId`](mob_types::ListingId)s
//! that may point at catalog listings or user listings alike. It is persisted
//! on every change and resolved into full listing objects on demand with
//! [`FavoritesStore::materialize`].

pub mod error;
pub mod store;

pub use error::{FavoritesError, FavoritesResult};
pub use store::{FavoritesStore, DEFAULT_FAVORITES_KEY};
