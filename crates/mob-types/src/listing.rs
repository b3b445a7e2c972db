use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::ListingId;

/// Field names owned by the store. Drafts never override them.
const RESERVED_FIELDS: [&str; 3] = ["id", "createdAt", "status"];

/// Publication state of a user listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Published,
}

/// A user-submitted listing.
///
/// The three store-assigned fields are typed; everything the caller supplied
/// (title, price, images, ...) is kept verbatim in `fields` and flattened
/// back into the same JSON object on serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub created_at: DateTime<Utc>,
    pub status: ListingStatus,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Listing {
    /// Look up a caller-supplied field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The `title` field, if it is a string.
    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }
}

/// Caller-supplied fields for a listing that has not been published yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingDraft {
    fields: Map<String, Value>,
}

impl ListingDraft {
    /// An empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the draft carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Turn the draft into a published listing.
    ///
    /// Any caller field named `id`, `createdAt` or `status` is dropped in
    /// favour of the assigned values.
    pub fn publish(self, id: ListingId, created_at: DateTime<Utc>) -> Listing {
        let mut fields = self.fields;
        for reserved in RESERVED_FIELDS {
            fields.remove(reserved);
        }
        Listing {
            id,
            created_at,
            status: ListingStatus::Published,
            fields,
        }
    }
}

impl From<Map<String, Value>> for ListingDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// A listing from the bundled, read-only catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogListing {
    pub id: ListingId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogListing {
    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A resolved listing from either source.
///
/// Serializes untagged, so the JSON is exactly that of the source record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FavoriteListing {
    User(Listing),
    Catalog(CatalogListing),
}

impl FavoriteListing {
    pub fn id(&self) -> ListingId {
        match self {
            Self::User(listing) => listing.id,
            Self::Catalog(listing) => listing.id,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::User(listing) => listing.field(name),
            Self::Catalog(listing) => listing.field(name),
        }
    }

    /// Returns `true` for user-submitted listings.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl From<Listing> for FavoriteListing {
    fn from(listing: Listing) -> Self {
        Self::User(listing)
    }
}

impl From<CatalogListing> for FavoriteListing {
    fn from(listing: CatalogListing) -> Self {
        Self::Catalog(listing)
    }
}
