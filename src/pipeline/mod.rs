//! Translation pipeline — shared session state plus the service that turns
//! submitted text into translations.
//!
//! # Architecture
//!
//! ```text
//! ClipboardMonitor ──┐
//!                    ├─▶ TranslationService::submit_text ──▶ tokio task ──▶ Translator
//! presentation layer ┘                                            │
//!                                                                 ▼
//!                      SharedState (latest pair, history) ◀── record_result
//!                                                                 │
//!                                        EventBus ◀── TranslationReady
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clipboard_translator::config::AppConfig;
//! use clipboard_translator::events::EventBus;
//! use clipboard_translator::pipeline::{new_shared_state, TranslationService};
//! use clipboard_translator::translate::TranslateClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let service = TranslationService::new(
//!         new_shared_state(&config),
//!         Arc::new(TranslateClient::from_config(&config.translate)),
//!         EventBus::new(),
//!         tokio::runtime::Handle::current(),
//!     );
//!     let record = service.translate_now("Hello".into()).await;
//!     println!("{}", record.formatted());
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{TranslationService, NOTHING_TO_TRANSLATE};
pub use state::{new_shared_state, SessionState, SharedState, TranslationRecord, HISTORY_CAPACITY};
