//! Browser host types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A cookie as held by the privileged cookie store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    /// URL the cookie was set for. Its host is the cookie's domain.
    pub url: String,
    pub value: String,
    /// Set without a `Domain` attribute: sent to the exact host only.
    #[serde(default, rename = "hostOnly")]
    pub host_only: bool,
}

impl Cookie {
    /// A domain cookie, sent to the URL's host and its subdomains.
    pub fn new(name: impl Into<String>, url: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            value: value.into(),
            host_only: false,
        }
    }

    pub fn host_only(mut self) -> Self {
        self.host_only = true;
        self
    }
}

/// Handle to one background browsing context (a tab, on a real browser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u64);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// How a context should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Whether the context becomes the active, focused surface.
    pub active: bool,
}

impl OpenOptions {
    /// Inactive context that must not steal focus.
    pub fn background() -> Self {
        Self { active: false }
    }
}

/// When an in-memory context reports ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyBehavior {
    Immediate,
    After(Duration),
    Never,
}

/// Counters kept by `CookieReader`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    pub lookups: u64,
    pub misses: u64,
    pub errors: u64,
}
