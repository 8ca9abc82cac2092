//! Error types for Cookie Copier.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cookie not found: {0}")]
    CookieNotFound(String),

    #[error("Failed to open background context: {0}")]
    ContextOpen(String),

    #[error("Background context not ready after {0}ms")]
    ContextTimeout(u64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
