use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use mob_listings::Catalog;
use mob_store::{read_json, write_json, KeyValueStore};
use mob_types::{FavoriteListing, Listing, ListingId};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{FavoritesError, FavoritesResult};

/// Storage key used for the favorite set.
pub const DEFAULT_FAVORITES_KEY: &str = "favorites";

/// Persisted, ordered set of favorited listing ids.
///
/// Every mutation goes through one commit path that writes the new set
/// before publishing it, so storage always follows the in-memory set and a
/// failed write changes nothing. The set never holds the same id twice.
pub struct FavoritesStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    ids: watch::Sender<Vec<ListingId>>,
    writer: Mutex<()>,
}

impl FavoritesStore {
    /// Open the store under `key` and load the persisted set.
    pub fn open(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (ids, _) = watch::channel(Vec::new());
        let store = Self {
            kv,
            key: key.into(),
            ids,
            writer: Mutex::new(()),
        };
        store.reload();
        store
    }

    /// Replace the in-memory set with the persisted one.
    ///
    /// Malformed data resets the set to empty with a warning. Inside a
    /// well-formed array, entries that are not listing ids are dropped one
    /// by one and the rest are kept. Entries that normalize to the same id
    /// are collapsed.
    pub fn reload(&self) -> usize {
        let loaded = match read_json::<Vec<Value>>(self.kv.as_ref(), &self.key) {
            Ok(Some(entries)) => dedup(
                entries
                    .into_iter()
                    .filter_map(|entry| parse_entry(&self.key, entry)),
            ),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable favorites; starting empty");
                Vec::new()
            }
        };
        let count = loaded.len();
        self.ids.send_replace(loaded);
        debug!(key = %self.key, count, "favorites loaded");
        count
    }

    /// Flip membership of `id`. Returns `true` if it is now a favorite.
    pub fn toggle(&self, id: ListingId) -> FavoritesResult<bool> {
        let _guard = self.writer.lock().expect("favorites lock poisoned");
        let mut next = self.ids();
        let now_favorite = match next.iter().position(|f| *f == id) {
            Some(index) => {
                next.remove(index);
                false
            }
            None => {
                next.push(id);
                true
            }
        };
        self.commit(next)?;
        debug!(%id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Replace the whole set. Duplicates are dropped, first occurrence wins.
    pub fn replace(&self, ids: impl IntoIterator<Item = ListingId>) -> FavoritesResult<()> {
        let _guard = self.writer.lock().expect("favorites lock poisoned");
        self.commit(dedup(ids))
    }

    /// Remove every favorite.
    pub fn clear(&self) -> FavoritesResult<()> {
        self.replace(std::iter::empty())
    }

    pub fn is_favorite(&self, id: ListingId) -> bool {
        self.ids.borrow().contains(&id)
    }

    /// Favorited ids in the order they were added.
    pub fn ids(&self) -> Vec<ListingId> {
        self.ids.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }

    /// Observe the favorite set.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ListingId>> {
        self.ids.subscribe()
    }

    /// Resolve the favorite set into listing objects.
    ///
    /// Walks user listings first, then the catalog, keeping those whose id
    /// is a favorite. An id present in both sources yields one object, the
    /// user listing.
    pub fn materialize(&self, catalog: &Catalog, user_listings: &[Listing]) -> Vec<FavoriteListing> {
        let favorites: HashSet<ListingId> = self.ids.borrow().iter().copied().collect();
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for listing in user_listings {
            if favorites.contains(&listing.id) && seen.insert(listing.id) {
                resolved.push(FavoriteListing::from(listing.clone()));
            }
        }
        for listing in catalog.iter() {
            if favorites.contains(&listing.id) && seen.insert(listing.id) {
                resolved.push(FavoriteListing::from(listing.clone()));
            }
        }
        resolved
    }

    /// Persist `next` and publish it, if it differs from the current set.
    fn commit(&self, next: Vec<ListingId>) -> FavoritesResult<()> {
        if *self.ids.borrow() == next {
            return Ok(());
        }
        write_json(self.kv.as_ref(), &self.key, &next).map_err(|e| {
            warn!(key = %self.key, error = %e, "failed to persist favorites");
            FavoritesError::from(e)
        })?;
        self.ids.send_replace(next);
        Ok(())
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("key", &self.key)
            .field("count", &self.len())
            .finish()
    }
}

fn parse_entry(key: &str, entry: Value) -> Option<ListingId> {
    match serde_json::from_value::<ListingId>(entry.clone()) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(key, %entry, error = %e, "dropping unrecognized favorite entry");
            None
        }
    }
}

fn dedup(ids: impl IntoIterator<Item = ListingId>) -> Vec<ListingId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
