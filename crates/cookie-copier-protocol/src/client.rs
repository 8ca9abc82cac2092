//! Panel-side client for the agent's request router.

use std::sync::Arc;
use std::time::Duration;

use cookie_copier_core::{Error, Result};
use tracing::{debug, warn};

use crate::messages::Request;
use crate::transport::Transport;

/// Sends requests from a panel and waits, bounded, for the agent's answer.
#[derive(Clone)]
pub struct PanelClient {
    transport: Arc<dyn Transport>,
    response_timeout: Duration,
}

impl PanelClient {
    pub fn new(transport: Arc<dyn Transport>, response_timeout: Duration) -> Self {
        Self {
            transport,
            response_timeout,
        }
    }

    /// Ask the agent for the value of cookie `key` at `url`.
    ///
    /// `Ok(None)` is the agent's absent-value answer. A missing answer, a
    /// closed transport, or an expired wait is an error.
    pub async fn get_cookie_value(&self, key: &str, url: &str) -> Result<Option<String>> {
        let id = uuid::Uuid::new_v4();
        let message = serde_json::to_value(Request::get_cookie_value(key, url))?;
        debug!("Request {}: {} at {}", id, key, url);

        match tokio::time::timeout(self.response_timeout, self.transport.send(id, message)).await {
            Ok(Ok(Some(response))) => Ok(response.cookie_value),
            Ok(Ok(None)) => {
                warn!("Request {} got no response", id);
                Err(Error::Transport(format!("no response to request {}", id)))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!("Request {} timed out", id);
                Err(Error::Transport(format!(
                    "request {} timed out after {}ms",
                    id,
                    self.response_timeout.as_millis()
                )))
            }
        }
    }
}
