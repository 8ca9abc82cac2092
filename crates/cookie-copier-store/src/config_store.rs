//! Config Store — label → watch record repository with a per-panel cache.

use std::sync::Arc;

use cookie_copier_core::CONFIG_STORAGE_KEY;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::types::{ConfigMap, WatchRecord};

/// Repository over the persisted mapping.
///
/// The cache is a point-in-time copy taken by `load_all` and updated by this
/// instance's own writes only. Every write persists the whole cache, so the
/// last writer across panels wins.
pub struct ConfigStore {
    backend: Arc<dyn StorageBackend>,
    cache: RwLock<ConfigMap>,
}

impl ConfigStore {
    /// Create a store with an empty cache. Call `load_all` before use.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(ConfigMap::new()),
        }
    }

    /// Create a store and seed its cache from the backend.
    pub async fn open(backend: Arc<dyn StorageBackend>) -> Self {
        let store = Self::new(backend);
        let loaded = store.load_all().await;
        info!("ConfigStore opened: {} watch records", loaded.len());
        store
    }

    /// Read the persisted mapping and reseed the cache with it.
    ///
    /// An absent entry or an undecodable value yields an empty mapping. A
    /// read error leaves the cache as it was and returns it, so the next
    /// write does not drop records this panel already knew about.
    pub async fn load_all(&self) -> ConfigMap {
        let map = match self.backend.get(CONFIG_STORAGE_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<ConfigMap>(value) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding undecodable {}: {}", CONFIG_STORAGE_KEY, e);
                    ConfigMap::new()
                }
            },
            Ok(None) => ConfigMap::new(),
            Err(e) => {
                warn!("Failed to read {}, keeping cached records: {}", CONFIG_STORAGE_KEY, e);
                return self.snapshot();
            }
        };

        *self.cache.write() = map.clone();
        map
    }

    /// Insert or overwrite the record at `label`, then persist the cache.
    pub async fn upsert(&self, label: &str, mut record: WatchRecord) {
        record.label = label.to_string();
        let snapshot = {
            let mut cache = self.cache.write();
            cache.insert(label.to_string(), record);
            cache.clone()
        };
        debug!("Upserted watch record: {}", label);
        self.persist(snapshot).await;
    }

    /// Delete the record at `label`, then persist the cache.
    ///
    /// Returns true if the label was present in this instance's cache.
    pub async fn remove(&self, label: &str) -> bool {
        let (removed, snapshot) = {
            let mut cache = self.cache.write();
            let removed = cache.remove(label).is_some();
            (removed, cache.clone())
        };
        debug!("Removed watch record: {} (present={})", label, removed);
        self.persist(snapshot).await;
        removed
    }

    /// Erase the entire persisted storage area and empty the cache.
    pub async fn clear(&self) {
        self.cache.write().clear();
        match self.backend.clear().await {
            Ok(()) => info!("Config store cleared"),
            Err(e) => warn!("Failed to clear config store: {}", e),
        }
    }

    /// Get a cached record by label.
    pub fn get(&self, label: &str) -> Option<WatchRecord> {
        self.cache.read().get(label).cloned()
    }

    /// Copy of the whole cache.
    pub fn snapshot(&self) -> ConfigMap {
        self.cache.read().clone()
    }

    /// Cached labels in display order.
    pub fn labels(&self) -> Vec<String> {
        self.cache.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    async fn persist(&self, snapshot: ConfigMap) {
        let value = match serde_json::to_value(&snapshot) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to encode config store: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.set(CONFIG_STORAGE_KEY, value).await {
            warn!("Failed to save config store: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{JsonFileBackend, MemoryBackend};
    use async_trait::async_trait;
    use cookie_copier_core::{Error, Result};
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn memory_store() -> (ConfigStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (ConfigStore::new(Arc::new(backend.clone())), backend)
    }

    fn record(label: &str, value: Option<&str>) -> WatchRecord {
        WatchRecord::new(label, "https://example.com", "x").with_value(value.map(String::from))
    }

    /// Backend whose reads and writes always fail.
    struct BrokenBackend;

    #[async_trait]
    impl StorageBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(Error::Storage("quota exceeded".into()))
        }
        async fn set(&self, _key: &str, _value: Value) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }
        async fn clear(&self) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }
    }

    /// Memory backend whose next read can be made to fail once.
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryBackend,
        fail_next_get: AtomicBool,
    }

    #[async_trait]
    impl StorageBackend for FlakyBackend {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(Error::Storage("storage area unavailable".into()));
            }
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: Value) -> Result<()> {
            self.inner.set(key, value).await
        }
        async fn clear(&self) -> Result<()> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn test_load_all_empty_store() {
        let (store, _backend) = memory_store();
        assert!(store.load_all().await.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_round_trip() {
        let (store, _backend) = memory_store();
        store.upsert("tz", record("tz", None)).await;

        let loaded = store.load_all().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["tz"], record("tz", None));
    }

    #[tokio::test]
    async fn test_upsert_forces_label() {
        let (store, _backend) = memory_store();
        store.upsert("sid", record("other", Some("v"))).await;
        let loaded = store.load_all().await;
        assert_eq!(loaded["sid"].label, "sid");
        assert!(!loaded.contains_key("other"));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (store, _backend) = memory_store();
        store.upsert("tz", record("tz", Some("first"))).await;
        store.upsert("tz", record("tz", Some("second"))).await;

        let loaded = store.load_all().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["tz"].value.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_remove_present_and_absent() {
        let (store, _backend) = memory_store();
        store.upsert("a", record("a", None)).await;
        store.upsert("b", record("b", None)).await;

        assert!(store.remove("a").await);
        assert!(!store.remove("never-added").await);

        let loaded = store.load_all().await;
        assert!(!loaded.contains_key("a"));
        assert!(!loaded.contains_key("never-added"));
        assert!(loaded.contains_key("b"));
    }

    #[tokio::test]
    async fn test_clear() {
        let (store, backend) = memory_store();
        store.upsert("a", record("a", None)).await;
        store.upsert("b", record("b", None)).await;

        store.clear().await;
        assert!(store.is_empty());
        assert!(backend.is_empty());
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_ignores_stale_cache() {
        let backend = MemoryBackend::new();
        let writer = ConfigStore::new(Arc::new(backend.clone()));
        let stale = ConfigStore::new(Arc::new(backend.clone()));
        writer.upsert("a", record("a", None)).await;

        // `stale` never loaded "a" but still erases it.
        stale.clear().await;
        assert!(writer.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_panels_diverge_until_reload() {
        let backend = MemoryBackend::new();
        let panel_a = ConfigStore::open(Arc::new(backend.clone())).await;
        let panel_b = ConfigStore::open(Arc::new(backend.clone())).await;

        panel_a.upsert("tz", record("tz", Some("v1"))).await;
        assert!(panel_b.get("tz").is_none());

        panel_b.load_all().await;
        assert_eq!(panel_b.get("tz").unwrap().value.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_undecodable_value_is_empty() {
        let backend = MemoryBackend::new();
        backend
            .set(CONFIG_STORAGE_KEY, serde_json::json!(["not", "a", "map"]))
            .await
            .unwrap();
        let store = ConfigStore::new(Arc::new(backend));
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failures_are_soft() {
        let store = ConfigStore::new(Arc::new(BrokenBackend));
        assert!(store.load_all().await.is_empty());

        store.upsert("tz", record("tz", Some("v"))).await;
        assert_eq!(store.get("tz").unwrap().value.as_deref(), Some("v"));

        store.clear().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_existing_records() {
        let backend = Arc::new(FlakyBackend::default());
        let store = ConfigStore::new(backend.clone());
        store.upsert("a", record("a", Some("1"))).await;
        store.upsert("b", record("b", Some("2"))).await;

        backend.fail_next_get.store(true, Ordering::SeqCst);
        let reloaded = store.load_all().await;
        assert_eq!(reloaded.len(), 2);

        store.upsert("c", record("c", Some("3"))).await;
        let persisted = ConfigStore::open(backend.clone()).await;
        assert_eq!(persisted.labels(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = ConfigStore::open(Arc::new(JsonFileBackend::new(&path))).await;
        store.upsert("tz", record("tz", Some("Europe/Paris"))).await;
        drop(store);

        let reopened = ConfigStore::open(Arc::new(JsonFileBackend::new(&path))).await;
        assert_eq!(reopened.labels(), vec!["tz".to_string()]);
        assert_eq!(reopened.get("tz").unwrap().value.as_deref(), Some("Europe/Paris"));
    }
}
