//! Language catalog — codes, display names and sentence-ending punctuation.
//!
//! The catalog is read from an optional `languages.json` document:
//!
//! ```json
//! { "languages": [ { "code": "bn", "name": "Bengali", "sentenceEnders": "।!?" } ] }
//! ```
//!
//! When the file is absent or cannot be parsed the built-in list is used.
//! Speech chunking asks the catalog which characters end a sentence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentence enders used when neither the catalog entry nor the built-in
/// table knows better.
pub const DEFAULT_SENTENCE_ENDERS: &str = ".!?";

/// Errors raised while reading `languages.json`.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("cannot read language file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid language file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("language file lists no languages")]
    Empty,
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// One selectable language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    #[serde(
        rename = "sentenceEnders",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sentence_enders: Option<String>,
}

impl Language {
    fn builtin(code: &str, name: &str) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            sentence_enders: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LanguageFile {
    languages: Vec<Language>,
}

// ---------------------------------------------------------------------------
// LanguageCatalog
// ---------------------------------------------------------------------------

/// Ordered list of languages offered to the presentation layer.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    languages: Vec<Language>,
}

impl LanguageCatalog {
    /// The fixed list used when no `languages.json` is available.
    pub fn builtin() -> Self {
        let languages = [
            ("auto", "Auto Detect"),
            ("en", "English"),
            ("bn", "Bengali"),
            ("hi", "Hindi"),
            ("ja", "Japanese"),
            ("zh-CN", "Chinese (Simplified)"),
            ("zh-TW", "Chinese (Traditional)"),
            ("ko", "Korean"),
            ("ar", "Arabic"),
            ("es", "Spanish"),
            ("fr", "French"),
            ("de", "German"),
            ("it", "Italian"),
            ("pt", "Portuguese"),
            ("ru", "Russian"),
            ("tr", "Turkish"),
            ("vi", "Vietnamese"),
            ("th", "Thai"),
        ]
        .iter()
        .map(|(code, name)| Language::builtin(code, name))
        .collect();

        Self { languages }
    }

    /// Parse a catalog from `path`.
    pub fn load(path: &Path) -> Result<Self, LanguageError> {
        let data = std::fs::read_to_string(path)?;
        let file: LanguageFile = serde_json::from_str(&data)?;
        if file.languages.is_empty() {
            return Err(LanguageError::Empty);
        }
        Ok(Self {
            languages: file.languages,
        })
    }

    /// Load `path`, falling back to [`builtin`](Self::builtin) on any error.
    pub fn load_or_builtin(path: &Path) -> Self {
        if !path.exists() {
            log::info!(
                "languages: {} not found, using built-in list",
                path.display()
            );
            return Self::builtin();
        }

        match Self::load(path) {
            Ok(catalog) => {
                log::info!("languages: loaded {} entries", catalog.languages.len());
                catalog
            }
            Err(e) => {
                log::warn!("languages: {e}; using built-in list");
                Self::builtin()
            }
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn find(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// Characters that terminate a sentence in `code`.
    ///
    /// Resolution order: the catalog entry, the built-in per-language
    /// default, then [`DEFAULT_SENTENCE_ENDERS`].
    pub fn sentence_enders_for(&self, code: &str) -> String {
        self.find(code)
            .and_then(|l| l.sentence_enders.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_sentence_enders(code).to_string())
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Per-language default punctuation.
pub fn default_sentence_enders(code: &str) -> &'static str {
    match code {
        "bn" | "hi" => "।!?",
        "ja" | "zh-CN" | "zh-TW" | "zh" => "。！？!?",
        "ar" => ".!?؟",
        "th" => ".!? ",
        _ => DEFAULT_SENTENCE_ENDERS,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_has_eighteen_languages_starting_with_auto() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.languages().len(), 18);
        assert_eq!(catalog.languages()[0].code, "auto");
        assert!(catalog.is_known("bn"));
        assert!(!catalog.is_known("xx"));
    }

    #[test]
    fn loads_file_with_sentence_enders() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("languages.json");
        std::fs::write(
            &path,
            r#"{"languages":[{"code":"en","name":"English"},{"code":"bn","name":"Bangla","sentenceEnders":"।"}]}"#,
        )
        .expect("write");

        let catalog = LanguageCatalog::load_or_builtin(&path);

        assert_eq!(catalog.languages().len(), 2);
        assert_eq!(catalog.find("bn").map(|l| l.name.as_str()), Some("Bangla"));
        assert_eq!(catalog.sentence_enders_for("bn"), "।");
        assert_eq!(catalog.sentence_enders_for("en"), ".!?");
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempdir().expect("temp dir");
        let catalog = LanguageCatalog::load_or_builtin(&dir.path().join("nope.json"));
        assert_eq!(catalog.languages().len(), 18);
    }

    #[test]
    fn malformed_file_falls_back_to_builtin() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("languages.json");
        std::fs::write(&path, "{ not json").expect("write");

        assert!(matches!(
            LanguageCatalog::load(&path),
            Err(LanguageError::Parse(_))
        ));
        assert_eq!(LanguageCatalog::load_or_builtin(&path).languages().len(), 18);
    }

    #[test]
    fn empty_list_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("languages.json");
        std::fs::write(&path, r#"{"languages":[]}"#).expect("write");

        assert!(matches!(LanguageCatalog::load(&path), Err(LanguageError::Empty)));
    }

    #[test]
    fn defaults_cover_cjk_and_bengali_scripts() {
        let catalog = LanguageCatalog::builtin();
        assert!(catalog.sentence_enders_for("ja").contains('。'));
        assert!(catalog.sentence_enders_for("bn").contains('।'));
        assert_eq!(catalog.sentence_enders_for("unknown"), DEFAULT_SENTENCE_ENDERS);
    }
}
