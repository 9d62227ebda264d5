//! System clipboard reader backed by the `arboard` crate.
//!
//! `arboard::Clipboard` is not `Send` on all platforms, so a
//! [`SystemClipboard`] is created on the polling thread itself and keeps its
//! handle there.  A failed read drops the handle; the next poll reopens it.

use arboard::Clipboard;

use super::{ClipboardError, ClipboardSource};

#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSource for SystemClipboard {
    /// Read the clipboard as plain text.
    ///
    /// An empty clipboard or non-text content (e.g. an image) reads as an
    /// empty string rather than an error.
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        let mut clipboard = match self.handle.take() {
            Some(clipboard) => clipboard,
            None => open_clipboard()?,
        };

        match clipboard.get_text() {
            Ok(text) => {
                self.handle = Some(clipboard);
                Ok(text)
            }
            Err(arboard::Error::ContentNotAvailable) => {
                self.handle = Some(clipboard);
                Ok(String::new())
            }
            Err(e) => Err(ClipboardError::Read(e.to_string())),
        }
    }
}

/// Open an `arboard::Clipboard` handle, mapping the error to [`ClipboardError`].
fn open_clipboard() -> Result<Clipboard, ClipboardError> {
    Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))
}
