//! Request URLs for the speech synthesis endpoint.

use reqwest::Url;

use crate::config::SpeechConfig;

use super::player::AudioError;

/// Builds one GET URL per chunk: `<tts_url>?ie=UTF-8&client=tw-ob&tl=<lang>&q=<chunk>`.
#[derive(Debug, Clone)]
pub struct SpeechUrlBuilder {
    base: String,
}

impl SpeechUrlBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(config.tts_url.clone())
    }

    /// `auto` has no voice, so it is spoken as English.
    pub fn build(&self, chunk: &str, language: &str) -> Result<Url, AudioError> {
        let language = if language == "auto" { "en" } else { language };
        Url::parse_with_params(
            &self.base,
            &[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
            ],
        )
        .map_err(|e| AudioError::InvalidUrl(format!("{}: {e}", self.base)))
    }
}
