//! Cookie Copier Store — the persisted label → watch record mapping.
//!
//! `ConfigStore` is the repository each panel instance holds. It keeps a
//! point-in-time cache of the mapping and writes the whole mapping back to a
//! `StorageBackend` after every local mutation. The backend is the only
//! state shared between panels.

pub mod backend;
pub mod config_store;
pub mod types;

pub use backend::{JsonFileBackend, MemoryBackend, StorageBackend};
pub use config_store::ConfigStore;
pub use types::*;
