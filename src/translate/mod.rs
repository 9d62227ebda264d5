//! Remote translation with a per-language segment cache.
//!
//! This module provides:
//! * [`Translator`] — async trait the translation service depends on.
//! * [`TranslateClient`] — API-key bootstrap + batched translate endpoint.
//! * [`TranslationCache`] — `target → segment → translation` store.
//! * [`formatting`] — whitespace placeholder encoding for segments.
//! * [`TranslateError`] — error variants for key fetch and translation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use clipboard_translator::config::TranslateConfig;
//! use clipboard_translator::translate::TranslateClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = TranslateClient::from_config(&TranslateConfig::default());
//!     let out = client.translate_batch("Hello\nWorld", "auto", "bn").await;
//!     println!("{out:?}");
//! }
//! ```

pub mod cache;
pub mod client;
pub mod formatting;

pub use cache::TranslationCache;
pub use client::{TranslateClient, TranslateError, Translator};
