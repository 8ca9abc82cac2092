//! Cookie Copier Core — error type, configuration, well-known names.

pub mod config;
pub mod error;

pub use config::{CopierConfig, DataPaths};
pub use error::{Error, Result};

/// Storage key under which the whole label → record mapping is persisted.
pub const CONFIG_STORAGE_KEY: &str = "cookie-value-copier-config";

/// Cookie name looked up when the action icon is clicked.
pub const ACTION_ICON_COOKIE: &str = "tz";
