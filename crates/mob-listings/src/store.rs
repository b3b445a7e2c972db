use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, SubsecRound, Utc};
use mob_store::{read_json, write_json, KeyValueStore};
use mob_types::{Listing, ListingDraft, ListingId};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::PropertyStoreConfig;
use crate::error::{ListingError, ListingResult};

/// Reactive collection of user-submitted listings.
///
/// The collection is loaded when the store is opened and persisted as one
/// JSON array after every mutation. Consumers observe it through
/// [`subscribe`](Self::subscribe) and the in-flight state through
/// [`loading`](Self::loading).
///
/// Mutations are serialized by a single-writer lock: each save or delete
/// reads the collection only after the previous mutation has committed, so
/// overlapping calls cannot overwrite each other. Memory is only updated
/// after the write succeeds, so a failed mutation leaves both memory and
/// storage at their previous state.
pub struct PropertyStore {
    kv: Arc<dyn KeyValueStore>,
    config: PropertyStoreConfig,
    listings: watch::Sender<Vec<Listing>>,
    loading: watch::Sender<bool>,
    in_flight: StdMutex<usize>,
    writer: Mutex<()>,
}

impl PropertyStore {
    /// Open the store and load the persisted collection.
    pub fn open(kv: Arc<dyn KeyValueStore>, config: PropertyStoreConfig) -> Self {
        let (listings, _) = watch::channel(Vec::new());
        let (loading, _) = watch::channel(false);
        let store = Self {
            kv,
            config,
            listings,
            loading,
            in_flight: StdMutex::new(0),
            writer: Mutex::new(()),
        };
        store.reload();
        store
    }

    /// Replace the in-memory collection with the persisted one.
    ///
    /// Unreadable or malformed data resets the collection to empty; the
    /// failure is logged, never returned. Returns the number of listings
    /// loaded.
    pub fn reload(&self) -> usize {
        let key = self.config.storage_key.as_str();
        let loaded = match read_json::<Vec<Listing>>(self.kv.as_ref(), key) {
            Ok(Some(listings)) => listings,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable listings; starting empty");
                Vec::new()
            }
        };
        let count = loaded.len();
        self.listings.send_replace(loaded);
        debug!(key, count, "listings loaded");
        count
    }

    /// Snapshot of all listings, oldest first.
    pub fn list(&self) -> Vec<Listing> {
        self.listings.borrow().clone()
    }

    /// Look up a listing by id.
    pub fn get(&self, id: ListingId) -> Option<Listing> {
        self.listings.borrow().iter().find(|l| l.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.listings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.borrow().is_empty()
    }

    /// Observe the collection. The receiver sees every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Listing>> {
        self.listings.subscribe()
    }

    /// Returns `true` while any save or delete is in flight.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Observe the in-flight flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn config(&self) -> &PropertyStoreConfig {
        &self.config
    }

    /// Publish a new listing.
    ///
    /// Assigns the id, creation time and status, waits the configured save
    /// latency, then appends and persists. Returns the stored listing.
    pub async fn save(&self, draft: ListingDraft) -> ListingResult<Listing> {
        let _busy = InFlight::enter(self);
        let _writer = self.writer.lock().await;
        tokio::time::sleep(self.config.save_latency()).await;

        let mut updated = self.list();
        let created_at = Utc::now().trunc_subsecs(3);
        let id = next_id(&updated, created_at);
        let listing = draft.publish(id, created_at);
        updated.push(listing.clone());

        if let Err(e) = write_json(self.kv.as_ref(), &self.config.storage_key, &updated) {
            let err = ListingError::persist(e);
            error!(%id, kind = ?err.kind(), error = %err, "failed to save listing");
            return Err(err);
        }

        self.listings.send_replace(updated);
        info!(%id, "listing published");
        Ok(listing)
    }

    /// Remove every listing with the given id.
    ///
    /// Deleting an id that does not exist succeeds without changing
    /// anything.
    pub async fn delete(&self, id: ListingId) -> ListingResult<()> {
        let _busy = InFlight::enter(self);
        let _writer = self.writer.lock().await;
        tokio::time::sleep(self.config.delete_latency()).await;

        let current = self.list();
        let before = current.len();
        let remaining: Vec<Listing> = current.into_iter().filter(|l| l.id != id).collect();
        let removed = before - remaining.len();

        if let Err(e) = write_json(self.kv.as_ref(), &self.config.storage_key, &remaining) {
            let err = ListingError::persist(e);
            error!(%id, kind = ?err.kind(), error = %err, "failed to delete listing");
            return Err(err);
        }

        self.listings.send_replace(remaining);
        if removed == 0 {
            debug!(%id, "delete of unknown listing");
        } else {
            info!(%id, removed, "listing deleted");
        }
        Ok(())
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("storage_key", &self.config.storage_key)
            .field("listing_count", &self.len())
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Millisecond timestamp id, bumped past the newest existing id when the
/// clock has not moved on since the previous save.
fn next_id(existing: &[Listing], created_at: DateTime<Utc>) -> ListingId {
    let candidate = ListingId::new(created_at.timestamp_millis().max(0) as u64);
    match existing.iter().map(|l| l.id).max() {
        Some(newest) if newest >= candidate => newest.successor(),
        _ => candidate,
    }
}

/// Keeps the loading flag raised while at least one mutation is running.
/// Dropping the guard lowers it again on every exit path.
struct InFlight<'a> {
    store: &'a PropertyStore,
}

impl<'a> InFlight<'a> {
    fn enter(store: &'a PropertyStore) -> Self {
        let mut count = store.in_flight.lock().expect("in-flight lock poisoned");
        *count += 1;
        store.loading.send_replace(true);
        Self { store }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut count = self.store.in_flight.lock().expect("in-flight lock poisoned");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.store.loading.send_replace(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use mob_store::{InMemoryKeyValueStore, StoreError, StoreResult};
    use serde_json::json;

    use crate::config::DEFAULT_LISTINGS_KEY;
    use crate::error::FailureKind;

    /// In-memory store whose writes can be switched off.
    #[derive(Default)]
    struct SwitchableStore {
        inner: InMemoryKeyValueStore,
        unavailable: AtomicBool,
    }

    impl KeyValueStore for SwitchableStore {
        fn read(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> StoreResult<()> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("writes disabled".into()));
            }
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<bool> {
            self.inner.remove(key)
        }

        fn keys(&self) -> StoreResult<Vec<String>> {
            self.inner.keys()
        }

        fn usage(&self) -> StoreResult<u64> {
            self.inner.usage()
        }
    }

    fn immediate_store() -> (Arc<InMemoryKeyValueStore>, PropertyStore) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = PropertyStore::open(kv.clone(), PropertyStoreConfig::immediate());
        (kv, store)
    }

    fn draft(title: &str) -> ListingDraft {
        ListingDraft::new().with("title", title)
    }

    fn persisted(kv: &dyn KeyValueStore) -> Vec<Listing> {
        read_json(kv, DEFAULT_LISTINGS_KEY).unwrap().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn save_publishes_and_lists() {
        let (_kv, store) = immediate_store();
        let listing = store.save(draft("Casa")).await.unwrap();

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["status"], json!("published"));
        assert!(value["createdAt"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(listing.title(), Some("Casa"));
        assert_eq!(store.list(), vec![listing]);
    }

    #[tokio::test]
    async fn save_persists_whole_collection() {
        let (kv, store) = immediate_store();
        store.save(draft("Casa")).await.unwrap();
        store.save(draft("Loft")).await.unwrap();

        assert_eq!(persisted(&*kv), store.list());
    }

    #[tokio::test]
    async fn saved_listing_survives_reopen() {
        let (kv, store) = immediate_store();
        let listing = store.save(draft("Casa")).await.unwrap();

        let reopened = PropertyStore::open(kv, PropertyStoreConfig::immediate());
        assert_eq!(reopened.get(listing.id), Some(listing));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let (_kv, store) = immediate_store();
        for title in ["a", "b", "c"] {
            store.save(draft(title)).await.unwrap();
        }
        let titles: Vec<_> = store
            .list()
            .iter()
            .map(|l| l.title().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn rapid_saves_get_distinct_ids() {
        let (_kv, store) = immediate_store();
        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(store.save(draft(&format!("l{i}"))).await.unwrap().id);
        }
        for w in ids.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn next_id_uses_clock_when_ahead() {
        let at = DateTime::from_timestamp_millis(5_000).unwrap();
        assert_eq!(next_id(&[], at), ListingId::new(5_000));

        let older = draft("old").publish(ListingId::new(4_000), at);
        assert_eq!(next_id(&[older], at), ListingId::new(5_000));

        let same = draft("same").publish(ListingId::new(5_000), at);
        assert_eq!(next_id(&[same], at), ListingId::new(5_001));
    }

    // -----------------------------------------------------------------------
    // Failure handling
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn capacity_failure_rolls_back_and_clears_loading() {
        let kv = Arc::new(InMemoryKeyValueStore::with_quota(256));
        let store = PropertyStore::open(kv.clone(), PropertyStoreConfig::immediate());
        let kept = store.save(draft("small")).await.unwrap();

        let photo = "x".repeat(1024);
        let err = store
            .save(draft("huge").with("images", vec![photo]))
            .await
            .unwrap_err();

        assert!(err.is_capacity());
        assert_eq!(err.kind(), Some(FailureKind::Capacity));
        assert!(!store.is_loading());
        assert_eq!(store.list(), vec![kept.clone()]);
        assert_eq!(persisted(&*kv), vec![kept]);
    }

    #[tokio::test]
    async fn storage_failure_on_delete_keeps_listing() {
        let kv = Arc::new(SwitchableStore::default());
        let store = PropertyStore::open(kv.clone(), PropertyStoreConfig::immediate());
        let listing = store.save(draft("Casa")).await.unwrap();

        kv.unavailable.store(true, Ordering::SeqCst);
        let err = store.delete(listing.id).await.unwrap_err();

        assert_eq!(err.kind(), Some(FailureKind::Storage));
        assert!(!store.is_loading());
        assert_eq!(store.list(), vec![listing]);
    }

    #[test]
    fn corrupt_storage_resets_to_empty() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.write(DEFAULT_LISTINGS_KEY, "[{\"id\": oops").unwrap();

        let store = PropertyStore::open(kv.clone(), PropertyStoreConfig::immediate());
        assert!(store.is_empty());
        // The corrupt value is left alone until the next successful write.
        assert!(kv.read(DEFAULT_LISTINGS_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn file_backed_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let open = || {
            let kv = Arc::new(mob_store::FileKeyValueStore::open(dir.path()).unwrap());
            PropertyStore::open(kv, PropertyStoreConfig::immediate())
        };

        let listing = open().save(draft("Casa")).await.unwrap();
        assert_eq!(open().list(), vec![listing]);

        std::fs::write(dir.path().join(format!("{DEFAULT_LISTINGS_KEY}.json")), "{oops").unwrap();
        assert!(open().is_empty());
    }

    #[tokio::test]
    async fn reload_picks_up_external_changes() {
        let (kv, store) = immediate_store();
        store.save(draft("Casa")).await.unwrap();

        kv.write(DEFAULT_LISTINGS_KEY, "[]").unwrap();
        assert_eq!(store.reload(), 0);
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_removes_and_persists() {
        let (kv, store) = immediate_store();
        let a = store.save(draft("a")).await.unwrap();
        let b = store.save(draft("b")).await.unwrap();

        store.delete(a.id).await.unwrap();
        assert_eq!(store.list(), vec![b.clone()]);
        assert_eq!(persisted(&*kv), vec![b]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_kv, store) = immediate_store();
        let a = store.save(draft("a")).await.unwrap();
        store.save(draft("b")).await.unwrap();

        store.delete(a.id).await.unwrap();
        let once = store.list();
        store.delete(a.id).await.unwrap();
        assert_eq!(store.list(), once);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_noop() {
        let (_kv, store) = immediate_store();
        let a = store.save(draft("a")).await.unwrap();
        store.delete(ListingId::new(1)).await.unwrap();
        assert_eq!(store.list(), vec![a]);
    }

    // -----------------------------------------------------------------------
    // Reactivity and latency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn subscribers_see_committed_mutations() {
        let (_kv, store) = immediate_store();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let listing = store.save(draft("Casa")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), vec![listing.clone()]);

        store.delete(listing.id).await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn loading_flag_tracks_in_flight_save() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(PropertyStore::open(kv, PropertyStoreConfig::default()));
        let started = tokio::time::Instant::now();

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.save(draft("Casa")).await }
        });
        tokio::task::yield_now().await;
        assert!(store.is_loading());
        assert!(store.is_empty());

        task.await.unwrap().unwrap();
        assert!(!store.is_loading());
        assert_eq!(store.len(), 1);
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_save_clears_loading_and_writes_nothing() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(PropertyStore::open(kv.clone(), PropertyStoreConfig::default()));

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.save(draft("Casa")).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_loading());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!store.is_loading());
        assert!(store.is_empty());
        assert!(kv.read(DEFAULT_LISTINGS_KEY).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_saves_do_not_lose_updates() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(PropertyStore::open(kv.clone(), PropertyStoreConfig::default()));

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.save(draft("first")).await }
        });
        let second = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.save(draft("second")).await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(persisted(&*kv).len(), 2);
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_waits_configured_latency() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = PropertyStore::open(kv, PropertyStoreConfig::default());
        let started = tokio::time::Instant::now();
        store.delete(ListingId::new(1)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn debug_format() {
        let (_kv, store) = immediate_store();
        let debug = format!("{store:?}");
        assert!(debug.contains("PropertyStore"));
        assert!(debug.contains("listing_count"));
    }
}
