//! Producer side of the event notifier.
//!
//! [`EventBus`] fans every published [`AppEvent`] out to all live
//! subscribers over unbounded tokio channels.  Publishing never blocks and
//! never runs consumer code, so it is safe from the clipboard thread, a
//! translation task or the playback thread alike.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// AppEvent
// ---------------------------------------------------------------------------

/// Notifications delivered from the core to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A new clipboard capture (or manual submission) is pending translation.
    NewText { text: String },
    /// A translation worker has started on `source`.
    TranslationStarted { source: String },
    /// A translation finished.  On failure `translation` holds the error
    /// message and `failed` is set; consumers always receive this event.
    TranslationReady {
        source: String,
        translation: String,
        failed: bool,
    },
    /// Speech playback ended, naturally or by `stop()`.
    PlaybackComplete,
    /// A speech chunk failed; remaining chunks were skipped.
    PlaybackError { message: String },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Cheap-to-clone publisher handle.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<AppEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every subscriber, pruning those that were dropped.
    pub fn publish(&self, event: AppEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());

        if subscribers.is_empty() {
            log::debug!("events: no subscribers for {event:?}");
        }
    }

    /// Open a new subscription.  Only events published afterwards are seen.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receiving end of one subscription.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl Subscription {
    /// Wait for the next event; `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}
