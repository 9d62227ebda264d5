//! Global hotkeys for speaking and stopping, backed by `rdev`.
//!
//! `rdev::listen()` blocks forever, so it runs on a dedicated
//! `hotkey-listener` OS thread and forwards [`HotkeyEvent`]s over a tokio
//! channel to the console front-end.
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use clipboard_translator::config::HotkeyConfig;
//! use clipboard_translator::hotkey::{HotkeyBindings, HotkeyListener};
//!
//! let bindings = HotkeyBindings::from_config(&HotkeyConfig::default()).unwrap();
//! let (tx, _rx) = mpsc::channel(16);
//! let _listener = HotkeyListener::start(bindings, tx).unwrap();
//! ```

pub mod listener;

pub use listener::HotkeyListener;

use thiserror::Error;

use crate::config::HotkeyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Speak the latest translation in the target language.
    SpeakTranslation,
    /// Speak the latest captured text in the source language.
    SpeakSource,
    StopSpeaking,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("unknown key name '{0}'")]
    UnknownKey(String),
}

// ---------------------------------------------------------------------------
// HotkeyBindings
// ---------------------------------------------------------------------------

/// Resolved key for each [`HotkeyEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotkeyBindings {
    pub speak_translation: rdev::Key,
    pub speak_source: rdev::Key,
    pub stop_speaking: rdev::Key,
}

impl HotkeyBindings {
    pub fn from_config(config: &HotkeyConfig) -> Result<Self, HotkeyError> {
        let resolve =
            |name: &str| parse_key(name).ok_or_else(|| HotkeyError::UnknownKey(name.to_string()));
        Ok(Self {
            speak_translation: resolve(&config.speak_translation_key)?,
            speak_source: resolve(&config.speak_source_key)?,
            stop_speaking: resolve(&config.stop_speaking_key)?,
        })
    }

    /// Event bound to `key`, if any.
    pub fn event_for(&self, key: rdev::Key) -> Option<HotkeyEvent> {
        if key == self.speak_translation {
            Some(HotkeyEvent::SpeakTranslation)
        } else if key == self.speak_source {
            Some(HotkeyEvent::SpeakSource)
        } else if key == self.stop_speaking {
            Some(HotkeyEvent::StopSpeaking)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

const FUNCTION_KEYS: [rdev::Key; 12] = [
    rdev::Key::F1,
    rdev::Key::F2,
    rdev::Key::F3,
    rdev::Key::F4,
    rdev::Key::F5,
    rdev::Key::F6,
    rdev::Key::F7,
    rdev::Key::F8,
    rdev::Key::F9,
    rdev::Key::F10,
    rdev::Key::F11,
    rdev::Key::F12,
];

/// Parse a key name from the config file, case-insensitively.
///
/// Accepts `F1`–`F12` and a handful of keys that are unlikely to clash with
/// typing (`Pause`, `ScrollLock`, `Insert`, ...).
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    let name = name.trim().to_ascii_lowercase();

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        return n.checked_sub(1).and_then(|i| FUNCTION_KEYS.get(i)).copied();
    }

    match name.as_str() {
        "pause" => Some(rdev::Key::Pause),
        "scrolllock" => Some(rdev::Key::ScrollLock),
        "printscreen" => Some(rdev::Key::PrintScreen),
        "insert" | "ins" => Some(rdev::Key::Insert),
        "escape" | "esc" => Some(rdev::Key::Escape),
        "home" => Some(rdev::Key::Home),
        "end" => Some(rdev::Key::End),
        "pageup" => Some(rdev::Key::PageUp),
        "pagedown" => Some(rdev::Key::PageDown),
        _ => None,
    }
}
