//! Shared translation session state.
//!
//! [`SessionState`] anchors the pipeline: the clipboard monitor appends to
//! `recent_texts`, translation workers overwrite the latest result pair and
//! append to the history, and the presentation layer changes the language
//! pair and reads results after a `TranslationReady` event.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>` — cheap to
//! clone and safe to share across threads.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;

/// Number of translation records kept in the history.
pub const HISTORY_CAPACITY: usize = 50;

// ---------------------------------------------------------------------------
// TranslationRecord
// ---------------------------------------------------------------------------

/// One completed translation, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub source: String,
    pub translation: String,
    pub source_language: String,
    pub target_language: String,
    pub failed: bool,
}

impl TranslationRecord {
    /// Two-line rendering used by history views.
    pub fn formatted(&self) -> String {
        format!("{}\n→ {}", self.source, self.translation)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

pub struct SessionState {
    /// Last distinct captures, oldest first.
    pub recent_texts: VecDeque<String>,
    recent_capacity: usize,

    pub source_language: String,
    pub target_language: String,

    /// Most recent result pair; overwritten by every finished translation.
    pub latest_source: Option<String>,
    pub latest_translation: Option<String>,

    pub history: VecDeque<TranslationRecord>,
}

impl SessionState {
    pub fn new(config: &AppConfig) -> Self {
        let recent_capacity = config.clipboard.history_capacity.max(1);
        Self {
            recent_texts: VecDeque::with_capacity(recent_capacity + 1),
            recent_capacity,
            source_language: config.translate.source_language.clone(),
            target_language: config.translate.target_language.clone(),
            latest_source: None,
            latest_translation: None,
            history: VecDeque::new(),
        }
    }

    /// Record a capture, evicting the oldest beyond capacity.
    pub fn push_recent(&mut self, text: String) {
        self.recent_texts.push_back(text);
        while self.recent_texts.len() > self.recent_capacity {
            self.recent_texts.pop_front();
        }
    }

    /// Overwrite the latest pair and append to the history.
    pub fn record_result(&mut self, record: TranslationRecord) {
        self.latest_source = Some(record.source.clone());
        self.latest_translation = Some(record.translation.clone());

        self.history.push_back(record);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Current `(source, target)` language pair.
    pub fn languages(&self) -> (String, String) {
        (self.source_language.clone(), self.target_language.clone())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

pub fn new_shared_state(config: &AppConfig) -> SharedState {
    Arc::new(Mutex::new(SessionState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
