//! Watch record types — matching the persisted storage shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One tracked cookie.
///
/// The label doubles as the cookie name that gets looked up, so it must match
/// the real cookie name on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    #[serde(rename = "key")]
    pub label: String,
    #[serde(default)]
    pub value: Option<String>,
    pub url: String,
    #[serde(rename = "favIconUrl", default)]
    pub icon_ref: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl WatchRecord {
    /// Create a record with no known value yet.
    pub fn new(label: impl Into<String>, url: impl Into<String>, icon_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            url: url.into(),
            icon_ref: icon_ref.into(),
            updated_at: None,
        }
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    /// Copy of this record carrying a freshly read value, stamped now.
    pub fn refreshed(&self, value: Option<String>) -> Self {
        Self {
            label: self.label.clone(),
            value,
            url: self.url.clone(),
            icon_ref: self.icon_ref.clone(),
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// The whole persisted mapping. Ordered so panels list labels stably.
pub type ConfigMap = BTreeMap<String, WatchRecord>;
