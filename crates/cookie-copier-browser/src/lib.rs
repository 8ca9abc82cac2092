//! Browser host seams — cookie storage, background browsing contexts, clipboard.
//!
//! Everything the privileged agent and the panels touch on the host platform
//! sits behind a trait here, with in-process implementations used by the
//! headless binary and by tests.

pub mod clipboard;
pub mod contexts;
pub mod cookies;
pub mod reader;
pub mod types;

pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use contexts::{BrowsingContexts, ContextGuard, MemoryContexts};
pub use cookies::{CookieJar, FileCookieJar, MemoryCookieJar};
pub use reader::CookieReader;
pub use types::*;
