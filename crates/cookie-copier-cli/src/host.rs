//! Headless host — one agent and one panel in a single process.

use std::sync::Arc;

use cookie_copier_browser::{Clipboard, CookieReader, FileCookieJar, MemoryClipboard, MemoryContexts};
use cookie_copier_core::{CopierConfig, Result};
use cookie_copier_protocol::{connect_local, PanelClient, RequestRouter};
use cookie_copier_runtime::PanelSession;
use cookie_copier_store::JsonFileBackend;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything a command needs.
pub struct Host {
    pub router: Arc<RequestRouter>,
    pub session: PanelSession,
    _agent: JoinHandle<()>,
}

impl Host {
    /// Start the agent over `cookies.json` and open a panel over `storage.json`.
    pub async fn start(config: &CopierConfig) -> Self {
        let paths = &config.data_paths;
        let reader = Arc::new(CookieReader::new(Arc::new(FileCookieJar::new(
            &paths.cookies_file,
        ))));
        let router = Arc::new(RequestRouter::new(reader));
        let (transport, agent) = connect_local(router.clone(), 16);

        let client = PanelClient::new(Arc::new(transport), config.response_timeout());
        let storage = Arc::new(JsonFileBackend::new(&paths.storage_file));
        info!(
            "Host starting: storage={}, cookies={}",
            storage.path().display(),
            paths.cookies_file.display()
        );
        let session = PanelSession::open(
            storage,
            client,
            Arc::new(MemoryContexts::new()),
            clipboard(),
            config.ready_timeout(),
        )
        .await;

        Self {
            router,
            session,
            _agent: agent,
        }
    }
}

#[cfg(feature = "system-clipboard")]
fn clipboard() -> Arc<dyn Clipboard> {
    or_memory_clipboard(cookie_copier_browser::SystemClipboard::new())
}

#[cfg(not(feature = "system-clipboard"))]
fn clipboard() -> Arc<dyn Clipboard> {
    warn!("Built without system-clipboard; copied values stay in this process");
    Arc::new(MemoryClipboard::new())
}

/// Use `system` when it connected, otherwise an in-process clipboard.
#[cfg_attr(not(feature = "system-clipboard"), allow(dead_code))]
fn or_memory_clipboard<C: Clipboard + 'static>(system: Result<C>) -> Arc<dyn Clipboard> {
    match system {
        Ok(clipboard) => Arc::new(clipboard),
        Err(e) => {
            warn!("System clipboard unavailable, copied values stay in this process: {}", e);
            Arc::new(MemoryClipboard::new())
        }
    }
}
