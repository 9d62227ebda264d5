//! Text-to-speech playback of translations.
//!
//! ```text
//! text ─▶ chunk() ─▶ PlaybackQueue ─▶ SpeechUrlBuilder ─▶ ChunkPlayer (RodioPlayer)
//!          ≤170 chars   one thread        GET …/translate_tts   reqwest + rodio + cpal
//! ```

pub mod chunker;
pub mod player;
pub mod queue;
pub mod url;

pub use chunker::{chunk, MAX_CHARS_PER_REQUEST};
pub use player::{list_output_devices, AudioError, ChunkPlayer, RodioPlayer};
pub use queue::{PlaybackQueue, PlaybackState};
pub use url::SpeechUrlBuilder;
