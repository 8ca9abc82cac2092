//! Message transport from a panel to the agent.

use std::sync::Arc;

use async_trait::async_trait;
use cookie_copier_core::{Error, Result};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::messages::{Envelope, RequestId, Response};
use crate::router::RequestRouter;

/// Delivers one message and waits for its reply.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns None when no listener answered the message.
    async fn send(&self, id: RequestId, message: Value) -> Result<Option<Response>>;
}

/// In-process transport over an mpsc channel to a serving router.
#[derive(Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, id: RequestId, message: Value) -> Result<Option<Response>> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(Envelope { id, message, reply })
            .await
            .map_err(|_| Error::Transport("agent is not listening".into()))?;
        Ok(answer.await.ok())
    }
}

/// Start `router` on its own task and return a transport connected to it.
///
/// The task ends once every clone of the transport is dropped.
pub fn connect_local(router: Arc<RequestRouter>, capacity: usize) -> (ChannelTransport, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(router.serve(rx));
    (ChannelTransport::new(tx), handle)
}
