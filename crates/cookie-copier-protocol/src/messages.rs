//! Wire types — matching the extension's runtime message shapes.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Operation tag for the only request the agent answers.
pub const GET_COOKIE_VALUE: &str = "getCookieValue";

/// Correlates one request with its response in traces.
pub type RequestId = uuid::Uuid;

/// Inbound request, tagged by `operation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum Request {
    #[serde(rename = "getCookieValue")]
    GetCookieValue {
        #[serde(rename = "cookieKey")]
        cookie_key: String,
        #[serde(rename = "cookieUrl")]
        cookie_url: String,
    },
    /// Any operation meant for some other listener.
    #[serde(other)]
    Unrecognized,
}

impl Request {
    pub fn get_cookie_value(cookie_key: impl Into<String>, cookie_url: impl Into<String>) -> Self {
        Self::GetCookieValue {
            cookie_key: cookie_key.into(),
            cookie_url: cookie_url.into(),
        }
    }
}

/// Response to `getCookieValue`. `None` is the absent-value marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "cookieValue")]
    pub cookie_value: Option<String>,
}

/// One message in flight on a channel transport, with its reply slot.
///
/// Dropping `reply` without sending tells the caller nobody answered.
#[derive(Debug)]
pub struct Envelope {
    pub id: RequestId,
    pub message: serde_json::Value,
    pub reply: oneshot::Sender<Response>,
}
