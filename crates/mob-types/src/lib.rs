//! Foundation types for Mobiliaria.
//!
//! Every other Mobiliaria crate depends on `mob-types`. The types here are
//! plain data: they know how to serialize themselves into the persisted JSON
//! blobs, but they never touch storage.
//!
//! # Key Types
//!
//! - [`ListingId`] -- Normalized listing identifier (numbers and numeric strings)
//! - [`Listing`] -- A user-submitted, published listing
//! - [`ListingDraft`] -- Caller-supplied fields for a listing about to be published
//! - [`CatalogListing`] -- A listing from the bundled read-only catalog
//! - [`FavoriteListing`] -- Either of the above, as returned by lookups

pub mod error;
pub mod id;
pub mod listing;

pub use error::TypeError;
pub use id::ListingId;
pub use listing::{CatalogListing, FavoriteListing, Listing, ListingDraft, ListingStatus};
