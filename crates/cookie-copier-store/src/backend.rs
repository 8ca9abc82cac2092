//! Persisted key/value storage areas.
//!
//! A backend models the browser's synced storage area: a flat map of string
//! keys to JSON values that outlives every panel instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cookie_copier_core::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

/// Trait for persisted storage areas.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read one entry. Returns None if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write one entry, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Erase every entry in the storage area.
    async fn clear(&self) -> Result<()>;
}

/// In-process storage area. Clones share the same entries, so several
/// panels built from clones of one backend see each other's writes.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Storage area kept as a single JSON object on disk.
///
/// Writes go to a sibling temp file that is renamed over the original, so a
/// reader never sees a truncated file.
pub struct JsonFileBackend {
    path: PathBuf,
    /// Serializes reads and read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(HashMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        let result = match tokio::fs::write(&tmp, json).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        result.map_err(|e| Error::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_all(&HashMap::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_backend_clones_share_entries() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.set("k", json!({"x": 1})).await.unwrap();
        assert_eq!(b.get("k").await.unwrap(), Some(json!({"x": 1})));
        b.clear().await.unwrap();
        assert!(a.is_empty());
    }

    #[tokio::test]
    async fn test_file_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(&dir.path().join("storage.json"));
        assert_eq!(backend.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("storage.json");

        let first = JsonFileBackend::new(&path);
        first.set("a", json!("one")).await.unwrap();
        first.set("b", json!([1, 2])).await.unwrap();

        let second = JsonFileBackend::new(&path);
        assert_eq!(second.path(), path.as_path());
        assert_eq!(second.get("a").await.unwrap(), Some(json!("one")));
        assert_eq!(second.get("b").await.unwrap(), Some(json!([1, 2])));

        second.clear().await.unwrap();
        assert_eq!(first.get("a").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_file_backend_reads_during_writes_see_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(JsonFileBackend::new(&dir.path().join("storage.json")));
        backend.set("stable", json!("kept")).await.unwrap();

        let writer = {
            let backend = backend.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    backend.set("counter", json!(i)).await.unwrap();
                }
            })
        };
        for _ in 0..50 {
            assert_eq!(backend.get("stable").await.unwrap(), Some(json!("kept")));
        }
        writer.await.unwrap();

        // A fresh instance reads the last complete file.
        let other = JsonFileBackend::new(backend.path());
        assert_eq!(other.get("counter").await.unwrap(), Some(json!(49)));
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_backend_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let backend = JsonFileBackend::new(&path);
        assert!(backend.get("a").await.is_err());
    }
}
