//! Clipboard monitoring — the producer end of the pipeline.
//!
//! ```text
//! SystemClipboard (arboard) ─▶ ClipboardWatcher ─▶ TranslationService::submit_text
//!        read every 200 ms       decode / dedupe        recent_texts + NewText + worker
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use clipboard_translator::clipboard::{ClipboardMonitor, SystemClipboard};
//! use clipboard_translator::config::ClipboardConfig;
//!
//! let _monitor = ClipboardMonitor::start(
//!     SystemClipboard::new,
//!     |text| println!("copied: {text}"),
//!     &ClipboardConfig::default(),
//! )
//! .expect("spawn clipboard thread");
//! ```

pub mod monitor;
pub mod system;

pub use monitor::{ClipboardMonitor, ClipboardWatcher};
pub use system::SystemClipboard;

use thiserror::Error;

/// Errors from a clipboard backend.  The monitor treats all of them as an
/// empty read.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Could not open the system clipboard.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// The clipboard was open but reading text failed.
    #[error("cannot read clipboard text: {0}")]
    Read(String),
}

/// Something the monitor can poll for text.
pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}
