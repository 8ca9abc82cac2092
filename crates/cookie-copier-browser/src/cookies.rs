//! Privileged cookie storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cookie_copier_core::{Error, Result};
use parking_lot::RwLock;
use url::Url;

use crate::types::Cookie;

/// Read access to the browser's cookie store.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Look up the cookie called `name` that would be sent to `url`.
    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>>;
}

/// Whether `cookie` would be sent to `url`.
///
/// Host-only cookies need an exact host match; domain cookies also match
/// subdomains. Names are compared by the caller.
pub fn applies_to(cookie: &Cookie, url: &Url) -> bool {
    let Ok(cookie_url) = Url::parse(&cookie.url) else {
        return false;
    };
    match (cookie_url.host_str(), url.host_str()) {
        (Some(domain), Some(host)) if cookie.host_only => host == domain,
        (Some(domain), Some(host)) => {
            host == domain || host.ends_with(&format!(".{}", domain))
        }
        _ => false,
    }
}

fn find<'a>(cookies: impl Iterator<Item = &'a Cookie>, name: &str, url: &Url) -> Option<Cookie> {
    cookies
        .filter(|c| c.name == name && applies_to(c, url))
        .last()
        .cloned()
}

/// In-process cookie store. Clones share the same cookies.
#[derive(Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Arc<RwLock<Vec<Cookie>>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie, replacing any cookie with the same name and URL.
    pub fn set(&self, cookie: Cookie) {
        let mut cookies = self.cookies.write();
        cookies.retain(|c| !(c.name == cookie.name && c.url == cookie.url));
        cookies.push(cookie);
    }

    pub fn remove(&self, name: &str, url: &str) {
        self.cookies
            .write()
            .retain(|c| !(c.name == name && c.url == url));
    }

    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }
}

#[async_trait]
impl CookieJar for MemoryCookieJar {
    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>> {
        Ok(find(self.cookies.read().iter(), name, url))
    }
}

/// Cookie store backed by a JSON array of cookies on disk.
///
/// The file is re-read on every lookup so edits made outside the process are
/// picked up. A missing file is an empty jar.
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl CookieJar for FileCookieJar {
    async fn get(&self, name: &str, url: &Url) -> Result<Option<Cookie>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let cookies: Vec<Cookie> = serde_json::from_str(&data)?;
        Ok(find(cookies.iter(), name, url))
    }
}
