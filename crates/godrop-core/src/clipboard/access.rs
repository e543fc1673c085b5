//! Cross-platform clipboard access.
//!
//! Text-only reading and writing of the OS clipboard using the `arboard`
//! crate, for hosts where the controller and the clipboard share a machine.

use arboard::Clipboard;

use crate::error::{Error, Result};

/// Platform-agnostic clipboard access trait.
pub trait ClipboardAccess: Send {
    /// Read current clipboard text. Empty when the clipboard holds no text.
    fn read_text(&mut self) -> Result<String>;

    /// Replace the clipboard text.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Native clipboard implementation using arboard.
pub struct NativeClipboard {
    clipboard: Clipboard,
}

impl NativeClipboard {
    /// Create a new native clipboard accessor.
    ///
    /// # Errors
    ///
    /// Returns an error if clipboard cannot be accessed.
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new()
            .map_err(|e| Error::ClipboardError(format!("failed to access clipboard: {e}")))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardAccess for NativeClipboard {
    fn read_text(&mut self) -> Result<String> {
        match self.clipboard.get_text() {
            Ok(text) => {
                tracing::trace!("Clipboard: read {} bytes of text", text.len());
                Ok(text)
            }
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(Error::ClipboardError(format!("failed to read text: {e}"))),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text.to_string())
            .map_err(|e| Error::ClipboardError(format!("failed to set text: {e}")))
    }
}
