//! Clipboard polling loop.
//!
//! [`ClipboardWatcher`] holds the per-tick decision logic (decode, dedupe,
//! baseline suppression) and is driven synchronously in tests.
//! [`ClipboardMonitor`] runs a watcher on a dedicated OS thread and hands
//! every new capture to a callback.
//!
//! # Shutdown
//!
//! The thread sleeps on a [`StopSignal`], so [`ClipboardMonitor::stop`]
//! (or dropping the monitor) wakes it immediately and joins it.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::ClipboardConfig;
use crate::entities::decode_entities;
use crate::pipeline::TranslationService;
use crate::stop::StopSignal;

use super::{ClipboardError, ClipboardSource};

// ---------------------------------------------------------------------------
// ClipboardWatcher
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ClipboardWatcher {
    previous: Option<String>,
    /// Set until the first successful read has been taken as the baseline.
    baseline_pending: bool,
}

impl ClipboardWatcher {
    /// With `skip_initial_content`, the first successful read (empty or not)
    /// is recorded as already seen and never reported.
    pub fn new(skip_initial_content: bool) -> Self {
        Self {
            previous: None,
            baseline_pending: skip_initial_content,
        }
    }

    /// Feed one read; returns the text when it counts as a new capture.
    pub fn observe(&mut self, read: Result<String, ClipboardError>) -> Option<String> {
        let raw = match read {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("clipboard: read failed ({e}), treating as empty");
                return None;
            }
        };

        let text = decode_entities(&raw).trim().to_string();

        if self.baseline_pending {
            self.baseline_pending = false;
            if !text.is_empty() {
                log::debug!("clipboard: baseline recorded ({} chars)", text.chars().count());
                self.previous = Some(text);
            }
            return None;
        }

        if text.is_empty() || self.previous.as_deref() == Some(text.as_str()) {
            return None;
        }

        self.previous = Some(text.clone());
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// ClipboardMonitor
// ---------------------------------------------------------------------------

/// Handle to a running clipboard polling thread.
pub struct ClipboardMonitor {
    stop: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
}

impl ClipboardMonitor {
    /// Spawn the polling thread.
    ///
    /// * `make_source` — builds the clipboard reader on the polling thread.
    /// * `on_new_text` — called on the polling thread for each new capture.
    pub fn start<S, F, H>(
        make_source: F,
        mut on_new_text: H,
        config: &ClipboardConfig,
    ) -> std::io::Result<Self>
    where
        S: ClipboardSource,
        F: FnOnce() -> S + Send + 'static,
        H: FnMut(String) + Send + 'static,
    {
        let stop = Arc::new(StopSignal::new());
        let stop_clone = Arc::clone(&stop);
        let interval = Duration::from_millis(config.poll_interval_ms.max(1));
        let skip_initial = config.skip_initial_content;

        let thread = std::thread::Builder::new()
            .name("clipboard-monitor".into())
            .spawn(move || {
                let mut source = make_source();
                let mut watcher = ClipboardWatcher::new(skip_initial);
                log::info!("clipboard: polling every {} ms", interval.as_millis());

                while !stop_clone.is_stopped() {
                    if let Some(text) = watcher.observe(source.read_text()) {
                        log::info!("clipboard: new text ({} chars)", text.chars().count());
                        on_new_text(text);
                    }
                    if stop_clone.wait_timeout(interval) {
                        break;
                    }
                }

                log::info!("clipboard: monitor stopped");
            })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Poll `make_source` and submit every new capture to `service`.
    pub fn spawn_for<S, F>(
        make_source: F,
        service: TranslationService,
        config: &ClipboardConfig,
    ) -> std::io::Result<Self>
    where
        S: ClipboardSource,
        F: FnOnce() -> S + Send + 'static,
    {
        Self::start(
            make_source,
            move |text| {
                service.submit_text(text);
            },
            config,
        )
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread, wake it from its sleep and wait for it to exit.
    pub fn stop(&mut self) {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("clipboard: monitor thread panicked");
            }
        }
    }
}

impl Drop for ClipboardMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
