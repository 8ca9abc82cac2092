//! Refresh Orchestrator — forces a cookie to exist, then reads it back.

use std::sync::Arc;
use std::time::Duration;

use cookie_copier_browser::{BrowsingContexts, ContextGuard};
use cookie_copier_core::{Error, Result};
use cookie_copier_protocol::PanelClient;
use cookie_copier_store::{ConfigStore, WatchRecord};
use tracing::{debug, info, warn};

use crate::types::RefreshOutcome;

/// Runs refreshes for one panel.
///
/// Every context opened by `refresh` is closed before it returns, and also
/// when the returned future is dropped mid-flight.
pub struct RefreshOrchestrator {
    contexts: Arc<dyn BrowsingContexts>,
    client: PanelClient,
    store: Arc<ConfigStore>,
    ready_timeout: Duration,
}

impl RefreshOrchestrator {
    pub fn new(
        contexts: Arc<dyn BrowsingContexts>,
        client: PanelClient,
        store: Arc<ConfigStore>,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            contexts,
            client,
            store,
            ready_timeout,
        }
    }

    /// Open a background context at `record.url`, read the cookie named
    /// `record.label` once it is ready, store the result, close the context.
    ///
    /// An absent cookie still updates the stored record. Failing to open the
    /// context, an expired ready-wait, or a failed request leaves the store
    /// untouched and returns the error. Nothing is retried.
    pub async fn refresh(&self, record: &WatchRecord) -> Result<RefreshOutcome> {
        let guard = ContextGuard::open(self.contexts.clone(), &record.url)
            .await
            .map_err(|e| {
                warn!("Refresh {}: cannot open {}: {}", record.label, record.url, e);
                match e {
                    Error::ContextOpen(_) => e,
                    other => Error::ContextOpen(other.to_string()),
                }
            })?;

        let value = match self.read_when_ready(&guard, record).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Refresh {} failed: {}", record.label, e);
                release(guard).await;
                return Err(e);
            }
        };

        let updated = record.refreshed(value);
        self.store.upsert(&record.label, updated.clone()).await;
        release(guard).await;

        if updated.value.is_some() {
            info!("Refreshed {}", record.label);
            Ok(RefreshOutcome::Refreshed(updated))
        } else {
            info!("Refreshed {}: cookie absent", record.label);
            Ok(RefreshOutcome::Absent(updated))
        }
    }

    async fn read_when_ready(&self, guard: &ContextGuard, record: &WatchRecord) -> Result<Option<String>> {
        guard.wait_ready(self.ready_timeout).await?;
        debug!("Context {} ready for {}", guard.id(), record.label);
        self.client.get_cookie_value(&record.label, &record.url).await
    }
}

async fn release(guard: ContextGuard) {
    let id = guard.id();
    if let Err(e) = guard.close().await {
        warn!("Failed to close background context {}: {}", id, e);
    }
}
