//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` cannot be interrupted.  Dropping the [`HotkeyListener`]
//! sets a flag so the callback forwards nothing more, but the thread stays
//! blocked in the rdev event loop until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{HotkeyBindings, HotkeyEvent};

/// Handle to a running hotkey listener thread.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn the listener and forward a [`HotkeyEvent`] on `tx` for every
    /// press of a bound key.  Key releases are ignored.
    pub fn start(
        bindings: HotkeyBindings,
        tx: mpsc::Sender<HotkeyEvent>,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }
                    if let rdev::EventType::KeyPress(key) = event.event_type {
                        if let Some(hotkey) = bindings.event_for(key) {
                            log::debug!("hotkey-listener: {hotkey:?}");
                            // Never block the OS hook; drop presses if the consumer lags.
                            if tx.try_send(hotkey).is_err() {
                                log::warn!("hotkey-listener: dropped {hotkey:?}");
                            }
                        }
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                }
            })?;

        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
