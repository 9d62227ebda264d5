//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + language catalog):
//!   Windows: %APPDATA%\clipboard-translator\
//!   macOS:   ~/Library/Application Support/clipboard-translator/
//!   Linux:   ~/.config/clipboard-translator/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `languages.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the optional `languages.json` catalog.
    pub languages_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "clipboard-translator";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self::in_dir(config_dir)
    }

    /// Lay out the standard file names under an explicit directory.
    pub fn in_dir(config_dir: PathBuf) -> Self {
        let settings_file = config_dir.join("settings.toml");
        let languages_file = config_dir.join("languages.json");

        Self {
            config_dir,
            settings_file,
            languages_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
