//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_READY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Paths to all Cookie Copier data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Persisted key/value storage area (`data/storage.json`).
    pub storage_file: PathBuf,
    /// Cookie jar used by the headless host (`data/cookies.json`).
    pub cookies_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            storage_file: root.join("storage.json"),
            cookies_file: root.join("cookies.json"),
            root,
        })
    }
}

/// Top-level Cookie Copier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopierConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// How long a refresh waits for its background context to become ready.
    pub ready_timeout_ms: u64,
    /// How long a panel waits for the agent to answer a request.
    pub response_timeout_ms: u64,
}

impl CopierConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let ready_timeout_ms =
            env_millis("COOKIE_COPIER_READY_TIMEOUT_MS", DEFAULT_READY_TIMEOUT_MS)?;
        let response_timeout_ms =
            env_millis("COOKIE_COPIER_RESPONSE_TIMEOUT_MS", DEFAULT_RESPONSE_TIMEOUT_MS)?;

        Ok(Self {
            data_paths: DataPaths::new(data_dir)?,
            ready_timeout_ms,
            response_timeout_ms,
        })
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

fn env_millis(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => parse_millis(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{} must be greater than zero", name))),
        Ok(ms) => Ok(ms),
        Err(_) => Err(Error::Config(format!("{} is not a number: {}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested");
        let paths = DataPaths::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(paths.storage_file, root.join("storage.json"));
        assert_eq!(paths.cookies_file, root.join("cookies.json"));
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("X", " 250 ").unwrap(), 250);
        assert!(matches!(parse_millis("X", "0"), Err(Error::Config(_))));
        assert!(matches!(parse_millis("X", "soon"), Err(Error::Config(_))));
    }

    #[test]
    fn test_timeouts_as_durations() {
        let dir = tempfile::tempdir().unwrap();
        let config = CopierConfig {
            data_paths: DataPaths::new(dir.path()).unwrap(),
            ready_timeout_ms: 1500,
            response_timeout_ms: 20,
        };
        assert_eq!(config.ready_timeout(), Duration::from_millis(1500));
        assert_eq!(config.response_timeout(), Duration::from_millis(20));
    }
}
