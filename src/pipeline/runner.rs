//! Translation service — turns submitted text into `TranslationReady` events.
//!
//! [`TranslationService`] is the explicitly constructed object that the
//! clipboard monitor and the presentation layer share.  It owns handles to
//! the [`SharedState`], the [`Translator`], the [`EventBus`] and the tokio
//! runtime that runs the workers.
//!
//! # Flow
//!
//! ```text
//! submit_text(text)                     (any thread)
//!   ├─▶ recent_texts.push(text)
//!   ├─▶ publish NewText
//!   └─▶ runtime.spawn(translate_now)    (one task per submission)
//!         ├─▶ publish TranslationStarted
//!         ├─▶ translator.translate(text, sl, tl)
//!         ├─▶ latest pair + history  ← last writer wins
//!         └─▶ publish TranslationReady  (always, error text on failure)
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::events::{AppEvent, EventBus};
use crate::translate::Translator;

use super::state::{SharedState, TranslationRecord};

/// Shown instead of a translation when the service had nothing to return.
pub const NOTHING_TO_TRANSLATE: &str = "Nothing to translate";

#[derive(Clone)]
pub struct TranslationService {
    state: SharedState,
    translator: Arc<dyn Translator>,
    bus: EventBus,
    runtime: Handle,
}

impl TranslationService {
    /// Create a new service.
    ///
    /// * `state`      — shared session state (also read by the presentation layer).
    /// * `translator` — remote client (e.g. `TranslateClient`).
    /// * `bus`        — where `NewText` / `TranslationStarted` / `TranslationReady` go.
    /// * `runtime`    — runtime that hosts the per-submission workers.
    pub fn new(
        state: SharedState,
        translator: Arc<dyn Translator>,
        bus: EventBus,
        runtime: Handle,
    ) -> Self {
        Self {
            state,
            translator,
            bus,
            runtime,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Record `text`, announce it and start a background translation.
    ///
    /// Returns `false` (and does nothing) for whitespace-only input.
    pub fn submit_text(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }

        self.lock_state().push_recent(text.clone());
        self.bus.publish(AppEvent::NewText { text: text.clone() });

        let service = self.clone();
        self.runtime.spawn(async move {
            service.translate_now(text).await;
        });
        true
    }

    /// Translate `text` with the current language pair, store the result
    /// and publish `TranslationReady`.  Never fails: errors become the
    /// translation text with `failed` set.
    pub async fn translate_now(&self, text: String) -> TranslationRecord {
        self.bus.publish(AppEvent::TranslationStarted {
            source: text.clone(),
        });

        let (source_language, target_language) = self.lock_state().languages();

        let (translation, failed) = match self
            .translator
            .translate(&text, &source_language, &target_language)
            .await
        {
            Ok(Some(translated)) => (translated, false),
            Ok(None) => {
                log::debug!("pipeline: nothing to translate");
                (NOTHING_TO_TRANSLATE.to_string(), true)
            }
            Err(e) => {
                log::warn!("pipeline: translation failed: {e}");
                (format!("Translation failed: {e}"), true)
            }
        };

        let record = TranslationRecord {
            source: text,
            translation,
            source_language,
            target_language,
            failed,
        };

        self.lock_state().record_result(record.clone());
        self.bus.publish(AppEvent::TranslationReady {
            source: record.source.clone(),
            translation: record.translation.clone(),
            failed,
        });

        record
    }

    // -----------------------------------------------------------------------
    // Language selection
    // -----------------------------------------------------------------------

    pub fn set_languages(&self, source: impl Into<String>, target: impl Into<String>) {
        let mut st = self.lock_state();
        st.source_language = source.into();
        st.target_language = target.into();
        log::info!(
            "pipeline: languages set to {} → {}",
            st.source_language,
            st.target_language
        );
    }

    /// Swap source and target.  Refused (returns `false`) while the source
    /// is `auto`, which cannot be a target.
    pub fn swap_languages(&self) -> bool {
        let mut st = self.lock_state();
        if st.source_language == "auto" {
            return false;
        }
        let st = &mut *st;
        std::mem::swap(&mut st.source_language, &mut st.target_language);
        true
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Current `(source, target)` language pair.
    pub fn languages(&self) -> (String, String) {
        self.lock_state().languages()
    }

    /// Latest `(source, translation)` pair.
    pub fn latest(&self) -> Option<(String, String)> {
        let st = self.lock_state();
        st.latest_source.clone().zip(st.latest_translation.clone())
    }

    pub fn recent_texts(&self) -> Vec<String> {
        self.lock_state().recent_texts.iter().cloned().collect()
    }

    pub fn history(&self) -> Vec<TranslationRecord> {
        self.lock_state().history.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.lock_state().history.clear();
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, super::state::SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::events::Subscription;
    use crate::pipeline::state::new_shared_state;
    use crate::translate::TranslateError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Tags the text with the language pair it was asked for.
    struct TaggingTranslator {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(
            &self,
            text: &str,
            source: &str,
            target: &str,
        ) -> Result<Option<String>, TranslateError> {
            self.calls.lock().unwrap().push(text.to_string());
            // Longer texts take longer, to force overlapping workers.
            tokio::time::sleep(Duration::from_millis(text.len() as u64 * 10)).await;
            Ok(Some(format!("[{source}>{target}] {text}")))
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<Option<String>, TranslateError> {
            Err(TranslateError::Timeout)
        }
    }

    struct EmptyTranslator;

    #[async_trait]
    impl Translator for EmptyTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<Option<String>, TranslateError> {
            Ok(None)
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn service_with(translator: Arc<dyn Translator>) -> (TranslationService, Subscription) {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        let service = TranslationService::new(
            new_shared_state(&AppConfig::default()),
            translator,
            bus,
            Handle::current(),
        );
        (service, sub)
    }

    fn tagging() -> Arc<TaggingTranslator> {
        Arc::new(TaggingTranslator {
            calls: Mutex::new(Vec::new()),
        })
    }

    async fn next_ready(sub: &mut Subscription) -> (String, String, bool) {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), sub.recv())
                .await
                .expect("event within 5 s")
                .expect("bus open");
            if let AppEvent::TranslationReady {
                source,
                translation,
                failed,
            } = event
            {
                return (source, translation, failed);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn submit_publishes_new_text_then_ready() {
        let (service, mut sub) = service_with(tagging());

        assert!(service.submit_text("Hello"));

        assert_eq!(
            sub.recv().await,
            Some(AppEvent::NewText {
                text: "Hello".into()
            })
        );
        assert_eq!(
            sub.recv().await,
            Some(AppEvent::TranslationStarted {
                source: "Hello".into()
            })
        );
        let (source, translation, failed) = next_ready(&mut sub).await;
        assert_eq!(source, "Hello");
        assert_eq!(translation, "[auto>bn] Hello");
        assert!(!failed);

        assert_eq!(service.recent_texts(), vec!["Hello".to_string()]);
        assert_eq!(
            service.latest(),
            Some(("Hello".to_string(), "[auto>bn] Hello".to_string()))
        );
    }

    #[tokio::test]
    async fn blank_submissions_are_ignored() {
        let translator = tagging();
        let (service, mut sub) = service_with(translator.clone());

        assert!(!service.submit_text("   \n\t"));
        assert!(sub.try_recv().is_none());
        assert!(translator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_still_fires_ready_with_message() {
        let (service, mut sub) = service_with(Arc::new(FailingTranslator));

        service.submit_text("Hello");
        let (_, translation, failed) = next_ready(&mut sub).await;

        assert!(failed);
        assert!(translation.contains("timed out"));
        assert_eq!(service.history().len(), 1);
        assert!(service.history()[0].failed);
    }

    #[tokio::test]
    async fn nothing_to_translate_is_reported() {
        let (service, _sub) = service_with(Arc::new(EmptyTranslator));

        let record = service.translate_now("x".into()).await;
        assert_eq!(record.translation, NOTHING_TO_TRANSLATE);
        assert!(record.failed);
    }

    #[tokio::test]
    async fn language_change_applies_to_next_request() {
        let (service, _sub) = service_with(tagging());

        service.set_languages("en", "ja");
        let record = service.translate_now("Hi".into()).await;

        assert_eq!(record.translation, "[en>ja] Hi");
        assert_eq!(record.target_language, "ja");
    }

    #[tokio::test]
    async fn swap_refuses_auto_source() {
        let (service, _sub) = service_with(tagging());

        assert!(!service.swap_languages());

        service.set_languages("en", "bn");
        assert!(service.swap_languages());
        assert_eq!(service.languages(), ("bn".to_string(), "en".to_string()));
    }

    /// Overlapping workers are not ordered: whichever finishes last owns the
    /// latest pair, and every submission still gets its own event.
    #[tokio::test]
    async fn overlapping_translations_last_writer_wins() {
        let (service, mut sub) = service_with(tagging());

        service.submit_text("a much longer clipboard capture");
        service.submit_text("short");

        let first = next_ready(&mut sub).await;
        let second = next_ready(&mut sub).await;

        assert_eq!(first.0, "short");
        assert_eq!(second.0, "a much longer clipboard capture");
        assert_eq!(
            service.latest().map(|(s, _)| s).as_deref(),
            Some("a much longer clipboard capture")
        );
        assert_eq!(service.history().len(), 2);
    }

    #[tokio::test]
    async fn clear_history_keeps_latest_pair() {
        let (service, _sub) = service_with(tagging());
        service.translate_now("one".into()).await;

        service.clear_history();

        assert!(service.history().is_empty());
        assert!(service.latest().is_some());
    }
}
