use std::sync::Arc;

use mob_favorites::FavoritesStore;
use mob_listings::{Catalog, PropertyStore};
use mob_media::{ImageIngestor, ImageSource};
use mob_store::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
use mob_types::{FavoriteListing, Listing, ListingDraft, ListingId};
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::error::SdkResult;
use crate::routes::View;
use crate::session::SessionMock;

/// Field the ingested photos of a listing are stored under.
pub const IMAGES_FIELD: &str = "images";

/// The application context.
///
/// Owns every store and service and hands out references to them. Built
/// once at startup and shared by the views.
pub struct Mobiliaria {
    config: AppConfig,
    properties: PropertyStore,
    favorites: FavoritesStore,
    catalog: Catalog,
    session: SessionMock,
    ingestor: ImageIngestor,
}

impl Mobiliaria {
    /// Open with data persisted under `config.data_dir`.
    pub fn open(config: AppConfig) -> SdkResult<Self> {
        let kv = FileKeyValueStore::with_quota(&config.data_dir, config.quota_bytes)?;
        Self::with_store(Arc::new(kv), config)
    }

    /// Open with default settings and nothing persisted beyond the process.
    pub fn in_memory() -> SdkResult<Self> {
        let config = AppConfig::default();
        let kv = InMemoryKeyValueStore::with_quota(config.quota_bytes);
        Self::with_store(Arc::new(kv), config)
    }

    /// Open on top of an existing key-value store.
    pub fn with_store(kv: Arc<dyn KeyValueStore>, config: AppConfig) -> SdkResult<Self> {
        let catalog = Catalog::bundled()?;
        let properties = PropertyStore::open(Arc::clone(&kv), config.listings.clone());
        let favorites = FavoritesStore::open(kv, config.favorites_key.clone());
        let ingestor = ImageIngestor::new(config.images.clone());
        info!(
            catalog = catalog.len(),
            listings = properties.len(),
            favorites = favorites.len(),
            "mobiliaria opened"
        );
        Ok(Self {
            config,
            properties,
            favorites,
            catalog,
            session: SessionMock::new(),
            ingestor,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionMock {
        &self.session
    }

    pub fn ingestor(&self) -> &ImageIngestor {
        &self.ingestor
    }

    // ---- Listings ----

    /// Ingest `images` and save the draft with them under [`IMAGES_FIELD`].
    ///
    /// Every image is ingested before anything is saved, so a photo that
    /// cannot be decoded leaves the store untouched. With no images the
    /// draft is saved as given.
    pub async fn publish<S: ImageSource>(
        &self,
        mut draft: ListingDraft,
        images: &[S],
    ) -> SdkResult<Listing> {
        if !images.is_empty() {
            let uris = self.ingestor.ingest_all(images).await?;
            let encoded: Vec<Value> = uris.iter().map(|u| Value::String(u.to_string())).collect();
            draft.insert(IMAGES_FIELD, encoded);
        }
        Ok(self.properties.save(draft).await?)
    }

    pub async fn remove_listing(&self, id: ListingId) -> SdkResult<()> {
        Ok(self.properties.delete(id).await?)
    }

    /// A listing for the detail view. User listings shadow catalog ones.
    pub fn listing(&self, id: ListingId) -> Option<FavoriteListing> {
        self.properties
            .get(id)
            .map(FavoriteListing::from)
            .or_else(|| self.catalog.get(id).cloned().map(FavoriteListing::from))
    }

    /// User listings followed by the catalog.
    pub fn explore(&self) -> Vec<FavoriteListing> {
        let user = self.properties.list();
        let catalog = self
            .catalog
            .iter()
            .filter(|c| !user.iter().any(|l| l.id == c.id))
            .cloned()
            .map(FavoriteListing::from);
        user.iter()
            .cloned()
            .map(FavoriteListing::from)
            .chain(catalog)
            .collect()
    }

    // ---- Favorites ----

    pub fn toggle_favorite(&self, id: ListingId) -> SdkResult<bool> {
        Ok(self.favorites.toggle(id)?)
    }

    pub fn favorite_listings(&self) -> Vec<FavoriteListing> {
        self.favorites.materialize(&self.catalog, &self.properties.list())
    }

    // ---- Views ----

    /// Whether `view` can be shown. Detail views need an existing listing.
    pub fn can_show(&self, view: &View) -> bool {
        match view {
            View::ListingDetail(id) => self.listing(*id).is_some(),
            _ => true,
        }
    }
}

impl std::fmt::Debug for Mobiliaria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mobiliaria")
            .field("data_dir", &self.config.data_dir)
            .field("listings", &self.properties.len())
            .field("favorites", &self.favorites.len())
            .field("catalog", &self.catalog.len())
            .finish()
    }
}
