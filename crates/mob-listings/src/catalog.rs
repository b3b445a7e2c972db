//! The bundled, read-only listing catalog.

use mob_types::{CatalogListing, ListingId};
use tracing::debug;

use crate::error::{ListingError, ListingResult};

const BUNDLED: &str = include_str!("../data/properties.json");

/// Static listings shipped with the application. Loaded once, never mutated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    listings: Vec<CatalogListing>,
}

impl Catalog {
    /// The dataset compiled into the binary.
    pub fn bundled() -> ListingResult<Self> {
        Self::from_json(BUNDLED)
    }

    /// Parse a catalog from a JSON array of listing objects.
    pub fn from_json(json: &str) -> ListingResult<Self> {
        let listings: Vec<CatalogListing> =
            serde_json::from_str(json).map_err(|e| ListingError::Catalog(e.to_string()))?;
        debug!(count = listings.len(), "catalog loaded");
        Ok(Self { listings })
    }

    pub fn from_listings(listings: Vec<CatalogListing>) -> Self {
        Self { listings }
    }

    pub fn get(&self, id: ListingId) -> Option<&CatalogListing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogListing> {
        self.listings.iter()
    }

    pub fn listings(&self) -> &[CatalogListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
