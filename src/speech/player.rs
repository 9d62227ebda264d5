//! Fetching and playing one chunk of synthesized speech.
//!
//! [`ChunkPlayer`] is the seam between the [`PlaybackQueue`] and the audio
//! stack.  [`RodioPlayer`] streams the MPEG payload with a blocking
//! `reqwest` client, decodes it with `rodio` and plays it on the configured
//! `cpal` output device.  Both the download and playback are polled so a
//! [`StopSignal`] can cut a chunk short.
//!
//! [`PlaybackQueue`]: super::PlaybackQueue

use std::io::{Cursor, Read};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

use crate::config::SpeechConfig;
use crate::stop::StopSignal;

/// How often a playing sink is checked for completion or a stop request.
const SINK_POLL_INTERVAL: Duration = Duration::from_millis(20);

const DOWNLOAD_PIECE_BYTES: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid speech URL {0}")]
    InvalidUrl(String),

    #[error("audio download failed: {0}")]
    Fetch(String),

    #[error("speech service returned HTTP {0}")]
    Status(u16),

    #[error("audio download timed out")]
    Timeout,

    #[error("audio output unavailable: {0}")]
    Device(String),

    #[error("could not decode audio: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AudioError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AudioError::Timeout
        } else if let Some(status) = e.status() {
            AudioError::Status(status.as_u16())
        } else {
            AudioError::Fetch(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkPlayer trait
// ---------------------------------------------------------------------------

/// Plays one chunk synchronously on the calling thread.
///
/// Implementations must return within about one poll interval once `stop`
/// is signalled, including while the audio is still downloading.
pub trait ChunkPlayer: Send + Sync {
    fn play_chunk(&self, url: &str, stop: &StopSignal) -> Result<(), AudioError>;
}

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

pub struct RodioPlayer {
    http: reqwest::blocking::Client,
    output_device: Option<String>,
    volume: f32,
}

impl RodioPlayer {
    pub fn from_config(config: &SpeechConfig) -> Result<Self, AudioError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AudioError::Fetch(e.to_string()))?;

        Ok(Self {
            http,
            output_device: config.output_device.clone(),
            volume: config.volume.max(0.0),
        })
    }

    /// Download `url`, giving up as soon as `stop` is signalled.
    ///
    /// The body is read in pieces on a `speech-download` thread so a stalled
    /// server cannot hold up a stop.  Returns `Ok(None)` when stopped.
    fn fetch(&self, url: &str, stop: &StopSignal) -> Result<Option<Vec<u8>>, AudioError> {
        let (tx, rx) = mpsc::channel::<Result<Vec<u8>, AudioError>>();
        let request = self.http.get(url);

        std::thread::Builder::new()
            .name("speech-download".into())
            .spawn(move || {
                if let Err(e) = stream_body(request, &tx) {
                    let _ = tx.send(Err(e));
                }
            })
            .map_err(|e| AudioError::Fetch(e.to_string()))?;

        let mut bytes = Vec::new();
        loop {
            if stop.is_stopped() {
                log::debug!("speech: download abandoned after {} bytes", bytes.len());
                return Ok(None);
            }
            match rx.recv_timeout(SINK_POLL_INTERVAL) {
                Ok(Ok(piece)) => bytes.extend_from_slice(&piece),
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        log::debug!("speech: fetched {} bytes", bytes.len());
        Ok(Some(bytes))
    }

    /// Open the configured output device, or the default one.
    ///
    /// The returned `OutputStream` must stay alive while the sink plays.
    fn open_output(&self) -> Result<(OutputStream, OutputStreamHandle), AudioError> {
        let Some(wanted) = self.output_device.as_deref() else {
            return OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()));
        };

        let host = cpal::default_host();
        let device = host
            .output_devices()
            .map_err(|e| AudioError::Device(e.to_string()))?
            .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false));

        match device {
            Some(device) => OutputStream::try_from_device(&device)
                .map_err(|e| AudioError::Device(format!("{wanted}: {e}"))),
            None => {
                log::warn!("speech: output device '{wanted}' not found, using default");
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))
            }
        }
    }
}

impl ChunkPlayer for RodioPlayer {
    fn play_chunk(&self, url: &str, stop: &StopSignal) -> Result<(), AudioError> {
        let Some(bytes) = self.fetch(url, stop)? else {
            return Ok(());
        };

        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode(e.to_string()))?;
        let (_stream, handle) = self.open_output()?;
        let sink = Sink::try_new(&handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.set_volume(self.volume);
        sink.append(source);

        while !sink.empty() {
            if stop.wait_timeout(SINK_POLL_INTERVAL) {
                sink.stop();
                break;
            }
        }

        Ok(())
    }
}

/// Send the response body to `tx` piece by piece.  Stops early once the
/// receiver is gone.
fn stream_body(
    request: reqwest::blocking::RequestBuilder,
    tx: &mpsc::Sender<Result<Vec<u8>, AudioError>>,
) -> Result<(), AudioError> {
    let mut response = request.send()?.error_for_status()?;
    let mut buf = [0u8; DOWNLOAD_PIECE_BYTES];
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| AudioError::Fetch(e.to_string()))?;
        if n == 0 || tx.send(Ok(buf[..n].to_vec())).is_err() {
            return Ok(());
        }
    }
}

/// Names of the output devices on the default host.
pub fn list_output_devices() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| AudioError::Device(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn player_is_object_safe_and_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ChunkPlayer>();
        assert_send_sync::<RodioPlayer>();
    }

    #[test]
    fn negative_volume_is_clamped() {
        let config = SpeechConfig {
            volume: -2.0,
            ..SpeechConfig::default()
        };
        let player = RodioPlayer::from_config(&config).unwrap();
        assert_eq!(player.volume, 0.0);
    }

    #[test]
    fn http_error_status_maps_to_status_variant() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/tts").with_status(503).create();

        let player = RodioPlayer::from_config(&SpeechConfig::default()).unwrap();
        let err = player
            .fetch(&format!("{}/tts", server.url()), &StopSignal::new())
            .unwrap_err();
        assert!(matches!(err, AudioError::Status(503)));
    }

    #[test]
    fn fetch_returns_body_bytes() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/tts")
            .with_header("content-type", "audio/mpeg")
            .with_body([0xFFu8, 0xFB, 0x90, 0x00])
            .create();

        let player = RodioPlayer::from_config(&SpeechConfig::default()).unwrap();
        let bytes = player
            .fetch(&format!("{}/tts", server.url()), &StopSignal::new())
            .unwrap();
        assert_eq!(bytes, Some(vec![0xFF, 0xFB, 0x90, 0x00]));
    }

    #[test]
    fn stop_abandons_a_stalled_download() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/tts")
            .with_header("content-type", "audio/mpeg")
            .with_chunked_body(|w| {
                w.write_all(&[0xFF, 0xFB])?;
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(&[0x90, 0x00])
            })
            .create();

        let player = RodioPlayer::from_config(&SpeechConfig::default()).unwrap();
        let stop = Arc::new(StopSignal::new());
        let stopper = {
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(100));
                stop.stop();
            })
        };

        let started = Instant::now();
        let result = player.play_chunk(&format!("{}/tts", server.url()), &stop);

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_millis(1500), "{:?}", started.elapsed());
        stopper.join().unwrap();
    }
}
