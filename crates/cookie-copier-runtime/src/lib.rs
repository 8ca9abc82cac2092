//! Runtime — refresh orchestration and the panel-side flows built on it.
//!
//! `RefreshOrchestrator` runs one open → read → persist → close cycle per
//! call. `PanelSession` is what a panel UI drives: it seeds its cache at
//! startup and exposes add, remove, refresh, and copy.

pub mod orchestrator;
pub mod panel;
pub mod types;

pub use orchestrator::RefreshOrchestrator;
pub use panel::PanelSession;
pub use types::*;
