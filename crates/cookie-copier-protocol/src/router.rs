//! Request Router — the privileged agent's message listener.

use std::sync::Arc;

use cookie_copier_browser::CookieReader;
use cookie_copier_core::ACTION_ICON_COOKIE;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::messages::{Envelope, Request, Response};

/// Outcome of looking at one inbound message.
pub enum Dispatch {
    /// Not ours. No response will be sent.
    Ignored,
    /// A response is forthcoming; await it to get the value.
    Pending(BoxFuture<'static, Response>),
}

impl Dispatch {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Dispatches panel requests to the cookie reader.
pub struct RequestRouter {
    reader: Arc<CookieReader>,
}

impl RequestRouter {
    pub fn new(reader: Arc<CookieReader>) -> Self {
        Self { reader }
    }

    /// Decide synchronously whether `message` gets a response.
    pub fn dispatch(&self, message: &Value) -> Dispatch {
        match serde_json::from_value::<Request>(message.clone()) {
            Ok(Request::GetCookieValue {
                cookie_key,
                cookie_url,
            }) => {
                let reader = self.reader.clone();
                Dispatch::Pending(Box::pin(async move {
                    let cookie_value = reader.read(&cookie_key, &cookie_url).await;
                    Response { cookie_value }
                }))
            }
            Ok(Request::Unrecognized) => {
                debug!("Ignoring message for another listener: {}", message);
                Dispatch::Ignored
            }
            Err(e) => {
                debug!("Ignoring malformed message: {}", e);
                Dispatch::Ignored
            }
        }
    }

    /// Handle one message end to end.
    pub async fn handle(&self, message: &Value) -> Option<Response> {
        match self.dispatch(message) {
            Dispatch::Pending(response) => Some(response.await),
            Dispatch::Ignored => None,
        }
    }

    /// Action icon clicked: look up the fixed cookie on the active page and
    /// trace the result. Debug path only; nothing is returned or stored.
    pub async fn on_action_clicked(&self, active_url: Option<&str>) {
        let Some(url) = active_url else {
            warn!("Action clicked without an active page url");
            return;
        };
        let value = self.reader.read(ACTION_ICON_COOKIE, url).await;
        info!("Action lookup {}@{}: {:?}", ACTION_ICON_COOKIE, url, value);
    }

    /// Answer envelopes until every sender is gone.
    ///
    /// Each lookup runs on its own task so a slow cookie store never holds
    /// up other panels.
    pub async fn serve(self: Arc<Self>, mut inbound: mpsc::Receiver<Envelope>) {
        info!("Request router listening");
        while let Some(envelope) = inbound.recv().await {
            let Envelope { id, message, reply } = envelope;
            match self.dispatch(&message) {
                Dispatch::Pending(response) => {
                    tokio::spawn(async move {
                        let response = response.await;
                        if reply.send(response).is_err() {
                            debug!("Request {} abandoned before reply", id);
                        }
                    });
                }
                // Dropping `reply` closes the caller's channel.
                Dispatch::Ignored => drop(reply),
            }
        }
        info!("Request router stopped");
    }
}
