//! Background browsing contexts and their scoped ownership.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cookie_copier_core::{Error, Result};
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::cookies::{applies_to, MemoryCookieJar};
use crate::types::{ContextId, Cookie, OpenOptions, ReadyBehavior};

/// Lifecycle control over browsing contexts (tabs).
#[async_trait]
pub trait BrowsingContexts: Send + Sync {
    /// Open a context at `url`.
    async fn open(&self, url: &str, options: OpenOptions) -> Result<ContextId>;

    /// Resolve once the context has finished loading. May never resolve;
    /// callers bound the wait.
    async fn wait_ready(&self, id: ContextId) -> Result<()>;

    /// Destroy the context.
    async fn close(&self, id: ContextId) -> Result<()>;
}

/// Exclusive ownership of one background context.
///
/// `close` releases it explicitly. If the guard is dropped without being
/// closed (the owning future was cancelled, or an early return was missed)
/// the close is spawned onto the current runtime.
pub struct ContextGuard {
    contexts: Arc<dyn BrowsingContexts>,
    id: ContextId,
    released: bool,
}

impl ContextGuard {
    /// Open an inactive context at `url`.
    pub async fn open(contexts: Arc<dyn BrowsingContexts>, url: &str) -> Result<Self> {
        let id = contexts.open(url, OpenOptions::background()).await?;
        debug!("Opened background context {} at {}", id, url);
        Ok(Self {
            contexts,
            id,
            released: false,
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Wait for the context to report ready, giving up after `timeout`.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.contexts.wait_ready(self.id)).await {
            Ok(result) => result,
            Err(_) => Err(Error::ContextTimeout(timeout.as_millis() as u64)),
        }
    }

    /// Destroy the context.
    pub async fn close(mut self) -> Result<()> {
        self.released = true;
        let result = self.contexts.close(self.id).await;
        debug!("Closed background context {}", self.id);
        result
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let contexts = self.contexts.clone();
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Background context {} dropped while open, closing", id);
                handle.spawn(async move {
                    if let Err(e) = contexts.close(id).await {
                        warn!("Failed to close background context {}: {}", id, e);
                    }
                });
            }
            Err(_) => warn!("Background context {} leaked: no runtime to close it", id),
        }
    }
}

#[derive(Default)]
struct ContextState {
    live: HashMap<ContextId, String>,
    opened: u64,
    closed: u64,
    last_options: Option<OpenOptions>,
}

/// In-process browsing contexts with scriptable readiness.
///
/// Site cookies registered with `with_site_cookie` are written into the
/// attached jar when a context on a matching host becomes ready, the way a
/// real page load sets its cookies.
pub struct MemoryContexts {
    next_id: AtomicU64,
    state: Mutex<ContextState>,
    ready: ReadyBehavior,
    fail_open: bool,
    jar: Option<MemoryCookieJar>,
    site_cookies: Vec<Cookie>,
}

impl MemoryContexts {
    /// Contexts that become ready as soon as they are opened.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state: Mutex::new(ContextState::default()),
            ready: ReadyBehavior::Immediate,
            fail_open: false,
            jar: None,
            site_cookies: Vec::new(),
        }
    }

    pub fn with_ready(mut self, ready: ReadyBehavior) -> Self {
        self.ready = ready;
        self
    }

    /// Every `open` fails.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Set `cookie` in `jar` whenever a matching context finishes loading.
    pub fn with_site_cookie(mut self, jar: MemoryCookieJar, cookie: Cookie) -> Self {
        self.jar = Some(jar);
        self.site_cookies.push(cookie);
        self
    }

    pub fn opened(&self) -> u64 {
        self.state.lock().opened
    }

    pub fn closed(&self) -> u64 {
        self.state.lock().closed
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn last_open_options(&self) -> Option<OpenOptions> {
        self.state.lock().last_options
    }

    fn load_site_cookies(&self, url: &str) {
        let (Some(jar), Ok(url)) = (&self.jar, Url::parse(url)) else {
            return;
        };
        for cookie in &self.site_cookies {
            if applies_to(cookie, &url) {
                jar.set(cookie.clone());
            }
        }
    }
}

impl Default for MemoryContexts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowsingContexts for MemoryContexts {
    async fn open(&self, url: &str, options: OpenOptions) -> Result<ContextId> {
        if self.fail_open {
            return Err(Error::ContextOpen(format!("cannot open {}", url)));
        }
        let id = ContextId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut state = self.state.lock();
        state.live.insert(id, url.to_string());
        state.opened += 1;
        state.last_options = Some(options);
        info!("Context {} opened at {} (active={})", id, url, options.active);
        Ok(id)
    }

    async fn wait_ready(&self, id: ContextId) -> Result<()> {
        let url = self
            .state
            .lock()
            .live
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("context {}", id)))?;

        match self.ready {
            ReadyBehavior::Immediate => {}
            ReadyBehavior::After(delay) => tokio::time::sleep(delay).await,
            ReadyBehavior::Never => std::future::pending::<()>().await,
        }

        self.load_site_cookies(&url);
        Ok(())
    }

    async fn close(&self, id: ContextId) -> Result<()> {
        let mut state = self.state.lock();
        if state.live.remove(&id).is_none() {
            return Err(Error::NotFound(format!("context {}", id)));
        }
        state.closed += 1;
        Ok(())
    }
}
