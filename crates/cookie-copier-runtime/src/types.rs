//! Runtime types.

use cookie_copier_store::WatchRecord;
use serde::Serialize;

/// Result of a refresh that ran to completion.
///
/// Both variants carry the record as it was written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// A value was found.
    Refreshed(WatchRecord),
    /// The cookie was absent; the stored value was cleared.
    Absent(WatchRecord),
}

impl RefreshOutcome {
    pub fn record(&self) -> &WatchRecord {
        match self {
            Self::Refreshed(record) | Self::Absent(record) => record,
        }
    }

    /// The fresh value, only when one was found.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Refreshed(record) => record.value.as_deref(),
            Self::Absent(_) => None,
        }
    }
}
