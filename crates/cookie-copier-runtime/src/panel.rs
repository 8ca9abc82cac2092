//! Panel session — the operations a panel UI invokes.

use std::sync::Arc;
use std::time::Duration;

use cookie_copier_browser::{BrowsingContexts, Clipboard};
use cookie_copier_core::{Error, Result};
use cookie_copier_protocol::PanelClient;
use cookie_copier_store::{ConfigMap, ConfigStore, StorageBackend, WatchRecord};
use tracing::{info, warn};
use url::Url;

use crate::orchestrator::RefreshOrchestrator;
use crate::types::RefreshOutcome;

/// State and flows of one panel instance.
///
/// Holds no authoritative state: the cache inside `store` is seeded from the
/// backend when the session opens and follows only this panel's writes.
pub struct PanelSession {
    store: Arc<ConfigStore>,
    client: PanelClient,
    orchestrator: RefreshOrchestrator,
    clipboard: Arc<dyn Clipboard>,
}

impl PanelSession {
    /// Start a panel: load the persisted mapping into a fresh cache.
    pub async fn open(
        backend: Arc<dyn StorageBackend>,
        client: PanelClient,
        contexts: Arc<dyn BrowsingContexts>,
        clipboard: Arc<dyn Clipboard>,
        ready_timeout: Duration,
    ) -> Self {
        let store = Arc::new(ConfigStore::open(backend).await);
        let orchestrator =
            RefreshOrchestrator::new(contexts, client.clone(), store.clone(), ready_timeout);
        Self {
            store,
            client,
            orchestrator,
            clipboard,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Cached records in label order, for rendering.
    pub fn records(&self) -> Vec<WatchRecord> {
        self.store.snapshot().into_values().collect()
    }

    /// Re-read the stored mapping and ask the agent for every label's
    /// current value, without opening background contexts.
    ///
    /// A label whose request fails keeps its stored record.
    pub async fn refresh_all(&self) -> ConfigMap {
        let stored = self.store.load_all().await;
        for (label, record) in &stored {
            match self.client.get_cookie_value(label, &record.url).await {
                Ok(value) => self.store.upsert(label, record.refreshed(value)).await,
                Err(e) => warn!("Keeping stored value for {}: {}", label, e),
            }
        }
        self.store.snapshot()
    }

    /// Start watching the cookie `label` at `url`.
    ///
    /// The cookie must exist right now; nothing is stored otherwise.
    pub async fn add_watch(&self, label: &str, url: &str, icon_ref: &str) -> Result<WatchRecord> {
        if label.is_empty() {
            return Err(Error::Config("label must not be empty".into()));
        }
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        let value = self
            .client
            .get_cookie_value(label, url)
            .await?
            .ok_or_else(|| Error::CookieNotFound(label.to_string()))?;

        let record = WatchRecord::new(label, url, icon_ref).refreshed(Some(value));
        self.store.upsert(label, record.clone()).await;
        info!("Watching {} at {}", label, url);
        Ok(record)
    }

    /// Stop watching `label`. Returns true if it was in this panel's cache.
    pub async fn remove_watch(&self, label: &str) -> bool {
        self.store.remove(label).await
    }

    /// Erase every stored record.
    pub async fn reset(&self) {
        self.store.clear().await;
    }

    /// Run a background refresh for a cached label.
    pub async fn refresh(&self, label: &str) -> Result<RefreshOutcome> {
        let record = self
            .store
            .get(label)
            .ok_or_else(|| Error::NotFound(label.to_string()))?;
        self.orchestrator.refresh(&record).await
    }

    /// Refresh `label` and put its value on the clipboard.
    ///
    /// An absent cookie is an error even though the record was updated.
    /// A clipboard failure is only logged.
    pub async fn copy(&self, label: &str) -> Result<String> {
        let value = match self.refresh(label).await? {
            RefreshOutcome::Refreshed(record) => record.value.unwrap_or_default(),
            RefreshOutcome::Absent(_) => return Err(Error::CookieNotFound(label.to_string())),
        };
        if let Err(e) = self.clipboard.write_text(&value) {
            warn!("Failed to copy {}: {}", label, e);
        }
        Ok(value)
    }
}
