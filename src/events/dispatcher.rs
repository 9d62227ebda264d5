//! Consumer side of the event notifier.
//!
//! A [`Dispatcher`] belongs to the presentation layer.  It owns one
//! [`Subscription`] and the registered listeners, and invokes them on
//! whatever context drains it — a UI frame callback via
//! [`dispatch_pending`](Dispatcher::dispatch_pending), or a dedicated task
//! via [`run`](Dispatcher::run).  Producers never call listeners directly.

use super::bus::{AppEvent, EventBus, Subscription};

type TextListener = Box<dyn FnMut(&str) + Send>;
type PairListener = Box<dyn FnMut(&str, &str) + Send>;
type SignalListener = Box<dyn FnMut() + Send>;

pub struct Dispatcher {
    subscription: Subscription,
    new_text: Vec<TextListener>,
    translation_started: Option<SignalListener>,
    translation_ready: Vec<PairListener>,
    playback_complete: Vec<SignalListener>,
    playback_error: Vec<TextListener>,
}

impl Dispatcher {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            subscription: bus.subscribe(),
            new_text: Vec::new(),
            translation_started: None,
            translation_ready: Vec::new(),
            playback_complete: Vec::new(),
            playback_error: Vec::new(),
        }
    }

    pub fn on_new_text(&mut self, f: impl FnMut(&str) + Send + 'static) -> &mut Self {
        self.new_text.push(Box::new(f));
        self
    }

    /// Set the single "translation started" listener, replacing any
    /// previous one.
    pub fn on_translation_started(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.translation_started = Some(Box::new(f));
        self
    }

    /// Add a `(source, translation)` listener.
    pub fn on_translation_ready(
        &mut self,
        f: impl FnMut(&str, &str) + Send + 'static,
    ) -> &mut Self {
        self.translation_ready.push(Box::new(f));
        self
    }

    pub fn on_playback_complete(&mut self, f: impl FnMut() + Send + 'static) -> &mut Self {
        self.playback_complete.push(Box::new(f));
        self
    }

    pub fn on_playback_error(&mut self, f: impl FnMut(&str) + Send + 'static) -> &mut Self {
        self.playback_error.push(Box::new(f));
        self
    }

    /// Invoke the listeners registered for `event`.
    pub fn dispatch(&mut self, event: &AppEvent) {
        match event {
            AppEvent::NewText { text } => {
                for f in &mut self.new_text {
                    f(text);
                }
            }
            AppEvent::TranslationStarted { .. } => {
                if let Some(f) = self.translation_started.as_mut() {
                    f();
                }
            }
            AppEvent::TranslationReady {
                source,
                translation,
                ..
            } => {
                for f in &mut self.translation_ready {
                    f(source, translation);
                }
            }
            AppEvent::PlaybackComplete => {
                for f in &mut self.playback_complete {
                    f();
                }
            }
            AppEvent::PlaybackError { message } => {
                for f in &mut self.playback_error {
                    f(message);
                }
            }
        }
    }

    /// Dispatch everything already queued without waiting.  Returns the
    /// number of events handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.subscription.try_recv() {
            self.dispatch(&event);
            handled += 1;
        }
        handled
    }

    /// Wait for one event, dispatch it and hand it back.  `None` once the
    /// bus is gone.
    pub async fn dispatch_next(&mut self) -> Option<AppEvent> {
        let event = self.subscription.recv().await?;
        self.dispatch(&event);
        Some(event)
    }

    /// Dispatch until every bus handle has been dropped.
    pub async fn run(mut self) {
        while self.dispatch_next().await.is_some() {}
        log::debug!("events: bus closed, dispatcher exiting");
    }
}
