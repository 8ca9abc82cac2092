//! Cookie Reader — single lookup against the privileged cookie store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, warn};
use url::Url;

use crate::cookies::CookieJar;
use crate::types::ReaderStats;

/// Reads one cookie value per call. Misses and platform errors come back as
/// `None` with a diagnostic; nothing is retried.
pub struct CookieReader {
    jar: Arc<dyn CookieJar>,
    lookups: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl CookieReader {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self {
            jar,
            lookups: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Value of the cookie `name` (case-sensitive) scoped to `url`.
    pub async fn read(&self, name: &str, url: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                error!("Runtime error occurred: invalid url {}: {}", url, e);
                return None;
            }
        };

        match self.jar.get(name, &parsed).await {
            Ok(Some(cookie)) if !cookie.value.is_empty() => {
                debug!("Read cookie {} for {}", name, url);
                Some(cookie.value)
            }
            Ok(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to get {}'s value.", name);
                None
            }
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                error!("Runtime error occurred: {}", e);
                None
            }
        }
    }

    pub fn stats(&self) -> ReaderStats {
        ReaderStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::MemoryCookieJar;
    use crate::types::Cookie;
    use async_trait::async_trait;
    use cookie_copier_core::{Error, Result};

    struct FailingJar;

    #[async_trait]
    impl CookieJar for FailingJar {
        async fn get(&self, _name: &str, _url: &Url) -> Result<Option<Cookie>> {
            Err(Error::Storage("cookie store unavailable".into()))
        }
    }

    fn reader_with(cookies: &[Cookie]) -> CookieReader {
        let jar = MemoryCookieJar::new();
        for c in cookies {
            jar.set(c.clone());
        }
        CookieReader::new(Arc::new(jar))
    }

    #[tokio::test]
    async fn test_read_hit() {
        let reader = reader_with(&[Cookie::new("tz", "https://example.com", "Asia/Tokyo")]);
        assert_eq!(
            reader.read("tz", "https://example.com").await.as_deref(),
            Some("Asia/Tokyo")
        );
        assert_eq!(
            reader.stats(),
            ReaderStats { lookups: 1, misses: 0, errors: 0 }
        );
    }

    #[tokio::test]
    async fn test_read_missing_cookie_is_absent() {
        let reader = reader_with(&[]);
        assert_eq!(reader.read("tz", "https://example.com").await, None);
        assert_eq!(reader.stats().misses, 1);
        assert_eq!(reader.stats().errors, 0);
    }

    #[tokio::test]
    async fn test_read_is_case_sensitive() {
        let reader = reader_with(&[Cookie::new("tz", "https://example.com", "UTC")]);
        assert_eq!(reader.read("Tz", "https://example.com").await, None);
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() {
        let reader = reader_with(&[Cookie::new("tz", "https://example.com", "")]);
        assert_eq!(reader.read("tz", "https://example.com").await, None);
        assert_eq!(reader.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_platform_error_is_absent() {
        let reader = CookieReader::new(Arc::new(FailingJar));
        assert_eq!(reader.read("tz", "https://example.com").await, None);
        assert_eq!(reader.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_absent() {
        let reader = reader_with(&[]);
        assert_eq!(reader.read("tz", "example dot com").await, None);
        assert_eq!(reader.stats().errors, 1);
    }
}
