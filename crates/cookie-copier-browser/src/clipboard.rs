//! Plain-text clipboard sinks.

use cookie_copier_core::{Error, Result};
#[cfg(feature = "system-clipboard")]
use parking_lot::Mutex;
use parking_lot::RwLock;

/// Destination for copied cookie values.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Clipboard that keeps the last written text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: RwLock<Option<String>>,
    fail_writes: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard that rejects every write.
    pub fn failing() -> Self {
        Self {
            contents: RwLock::new(None),
            fail_writes: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.read().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Clipboard("clipboard is not writable".into()));
        }
        *self.contents.write() = Some(text.to_string());
        Ok(())
    }
}

/// The desktop clipboard, via `arboard`.
///
/// Holds one handle for its whole lifetime. On X11 and Wayland the process
/// serves the copied text itself, and dropping the last handle hands it to
/// the clipboard manager, so keep this alive until the process is done.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Connect to the desktop clipboard. Fails on headless hosts.
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.inner
            .lock()
            .set_text(text.to_string())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);
        clipboard.write_text("Asia/Tokyo").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn test_failing_clipboard() {
        let clipboard = MemoryClipboard::failing();
        assert!(matches!(clipboard.write_text("x"), Err(Error::Clipboard(_))));
        assert_eq!(clipboard.contents(), None);
    }
}
