//! Clipboard translator: watches the clipboard, translates new text with the
//! web translate endpoint and speaks results on demand.
//!
//! The binary in `main.rs` wires these modules into a console front-end.

pub mod clipboard;
pub mod config;
pub mod entities;
pub mod events;
pub mod hotkey;
pub mod pipeline;
pub mod speech;
pub mod stop;
pub mod translate;
