//! Sequential, interruptible playback of chunked speech.
//!
//! ```text
//! play(text) ─▶ stop previous ─▶ chunk() ─▶ "speech-playback" thread
//!                                               for each chunk:
//!                                                 build URL ─▶ ChunkPlayer::play_chunk
//!                                                 gap (interruptible)
//!                                               on_error?  then on_complete (always)
//! ```
//!
//! Every `play` gets its own [`StopSignal`], so stopping one playback can
//! never leak into the next.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::SpeechConfig;
use crate::stop::StopSignal;

use super::chunker::chunk;
use super::player::ChunkPlayer;
use super::url::SpeechUrlBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Stopped,
}

impl PlaybackState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Stopped,
            _ => PlaybackState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PlaybackState::Idle => 0,
            PlaybackState::Playing => 1,
            PlaybackState::Stopped => 2,
        }
    }
}

struct ActivePlayback {
    stop: Arc<StopSignal>,
    thread: JoinHandle<()>,
}

pub struct PlaybackQueue {
    player: Arc<dyn ChunkPlayer>,
    urls: SpeechUrlBuilder,
    max_chars: usize,
    chunk_gap: Duration,
    state: Arc<AtomicU8>,
    current: Mutex<Option<ActivePlayback>>,
}

impl PlaybackQueue {
    pub fn new(player: Arc<dyn ChunkPlayer>, config: &SpeechConfig) -> Self {
        Self {
            player,
            urls: SpeechUrlBuilder::from_config(config),
            max_chars: config.max_chars_per_request,
            chunk_gap: Duration::from_millis(config.chunk_gap_ms),
            state: Arc::new(AtomicU8::new(PlaybackState::Idle.as_u8())),
            current: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Speak `text` in `language`, replacing any playback in progress.
    ///
    /// `on_error` fires at most once, before `on_complete`.  `on_complete`
    /// fires exactly once per call, immediately when there is nothing to say.
    /// Both run on the playback thread, except for the empty-text case.
    pub fn play<C, E>(
        &self,
        text: &str,
        language: &str,
        sentence_enders: &str,
        on_complete: C,
        on_error: E,
    ) -> std::io::Result<()>
    where
        C: FnOnce() + Send + 'static,
        E: FnOnce(String) + Send + 'static,
    {
        let chunks = chunk(text, sentence_enders, self.max_chars);

        loop {
            self.stop();
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            // Another caller may have started playback while we were joining.
            if current.as_ref().is_some_and(|a| !a.thread.is_finished()) {
                continue;
            }

            if chunks.is_empty() {
                *current = None;
                drop(current);
                on_complete();
                return Ok(());
            }

            log::info!("speech: playing {} chunk(s) in {language}", chunks.len());
            self.state.store(PlaybackState::Playing.as_u8(), Ordering::SeqCst);

            let stop = Arc::new(StopSignal::new());
            let job = PlaybackJob {
                chunks,
                language: language.to_string(),
                player: Arc::clone(&self.player),
                urls: self.urls.clone(),
                chunk_gap: self.chunk_gap,
                stop: Arc::clone(&stop),
                state: Arc::clone(&self.state),
            };

            let spawned = std::thread::Builder::new()
                .name("speech-playback".into())
                .spawn(move || job.run(on_complete, on_error));

            return match spawned {
                Ok(thread) => {
                    *current = Some(ActivePlayback { stop, thread });
                    Ok(())
                }
                Err(e) => {
                    self.state.store(PlaybackState::Idle.as_u8(), Ordering::SeqCst);
                    Err(e)
                }
            };
        }
    }

    /// Stop playback and wait for the playback thread to finish.  Idempotent.
    ///
    /// When called from the playback thread itself (e.g. inside a callback)
    /// it only signals.
    pub fn stop(&self) {
        let active = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let Some(active) = active else {
            return;
        };

        active.stop.stop();
        if active.thread.thread().id() == std::thread::current().id() {
            return;
        }
        if active.thread.join().is_err() {
            log::error!("speech: playback thread panicked");
            self.state.store(PlaybackState::Idle.as_u8(), Ordering::SeqCst);
        }
    }
}

impl Drop for PlaybackQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// PlaybackJob
// ---------------------------------------------------------------------------

/// Everything the playback thread owns.
struct PlaybackJob {
    chunks: Vec<String>,
    language: String,
    player: Arc<dyn ChunkPlayer>,
    urls: SpeechUrlBuilder,
    chunk_gap: Duration,
    stop: Arc<StopSignal>,
    state: Arc<AtomicU8>,
}

impl PlaybackJob {
    fn run<C, E>(self, on_complete: C, on_error: E)
    where
        C: FnOnce(),
        E: FnOnce(String),
    {
        let mut error = None;

        for (i, piece) in self.chunks.iter().enumerate() {
            if self.stop.is_stopped() {
                break;
            }
            if i > 0 && self.stop.wait_timeout(self.chunk_gap) {
                break;
            }

            log::debug!("speech: chunk {}/{}", i + 1, self.chunks.len());
            let result = self
                .urls
                .build(piece, &self.language)
                .and_then(|url| self.player.play_chunk(url.as_str(), &self.stop));

            if let Err(e) = result {
                log::warn!("speech: chunk {} failed: {e}", i + 1);
                error = Some(e.to_string());
                break;
            }
        }

        let final_state = if self.stop.is_stopped() {
            PlaybackState::Stopped
        } else {
            PlaybackState::Idle
        };
        self.state.store(final_state.as_u8(), Ordering::SeqCst);

        if let Some(message) = error {
            on_error(message);
        }
        on_complete();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
