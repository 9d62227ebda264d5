//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TranslateConfig
// ---------------------------------------------------------------------------

/// Remote translation endpoints and the initial language pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Bootstrap script that references the secondary script holding the key.
    pub bootstrap_url: String,
    /// Batch translate endpoint (POST, `application/json+protobuf`).
    pub translate_url: String,
    /// Client tag sent as the second element of the request body.
    pub client_tag: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Source language code; `"auto"` lets the service detect it.
    pub source_language: String,
    /// Target language code.
    pub target_language: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            bootstrap_url:
                "https://translate.google.com/translate_a/element.js?cb=gtElInit&hl=en-US&client=wt"
                    .into(),
            translate_url: "https://translate-pa.googleapis.com/v1/translateHtml".into(),
            client_tag: "wt_lib".into(),
            timeout_secs: 10,
            source_language: "auto".into(),
            target_language: "bn".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClipboardConfig
// ---------------------------------------------------------------------------

/// Clipboard polling behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Milliseconds between clipboard reads.
    pub poll_interval_ms: u64,
    /// Number of distinct recent captures kept in memory.
    pub history_capacity: usize,
    /// Treat whatever is on the clipboard at start-up as already seen.
    pub skip_initial_content: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            history_capacity: 10,
            skip_initial_content: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Text-to-speech endpoint and playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Base URL of the speech synthesis endpoint (returns MPEG audio).
    pub tts_url: String,
    /// Upper bound on characters sent in a single synthesis request.
    pub max_chars_per_request: usize,
    /// Pause between consecutive chunks, in milliseconds.
    pub chunk_gap_ms: u64,
    /// Per-request timeout for fetching a chunk's audio, in seconds.
    pub timeout_secs: u64,
    /// Output device name — `None` means the system default.
    pub output_device: Option<String>,
    /// Playback volume (1.0 = unchanged).
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tts_url: "https://translate.google.com/translate_tts".into(),
            max_chars_per_request: 170,
            chunk_gap_ms: 100,
            timeout_secs: 10,
            output_device: None,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings for the console front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Speak the latest translation.
    pub speak_translation_key: String,
    /// Speak the latest source text.
    pub speak_source_key: String,
    /// Stop any speech in progress.
    pub stop_speaking_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            speak_translation_key: "F8".into(),
            speak_source_key: "F7".into(),
            stop_speaking_key: "F6".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use clipboard_translator::config::{AppConfig, AppPaths};
///
/// // Writes the defaults on first run
/// let config = AppConfig::load_or_create_at(&AppPaths::new().settings_file).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub translate: TranslateConfig,
    pub clipboard: ClipboardConfig,
    pub speech: SpeechConfig,
    pub hotkey: HotkeyConfig,
}

impl AppConfig {
    /// Load `path`, writing the defaults there first if it does not exist
    /// yet.
    pub fn load_or_create_at(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        config.save_to(path)?;
        log::info!("config: wrote defaults to {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
