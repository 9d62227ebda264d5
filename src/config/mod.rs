//! Configuration module for the clipboard translator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `AppConfig::load_or_create_at` / `AppConfig::save_to`, and the `LanguageCatalog`.

pub mod languages;
pub mod paths;
pub mod settings;

pub use languages::{Language, LanguageCatalog, LanguageError, DEFAULT_SENTENCE_ENDERS};
pub use paths::AppPaths;
pub use settings::{AppConfig, ClipboardConfig, HotkeyConfig, SpeechConfig, TranslateConfig};
