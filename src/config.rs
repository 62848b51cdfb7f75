//! Server configuration
//!
//! Loaded from environment variables (with `.env` support via dotenvy in
//! `main`). Every setting has a default suitable for local use.

use std::path::PathBuf;

/// How an empty language selection is handled.
///
/// One deployment style silently falls back to a default language, another
/// treats an empty selection as a user error. Both exist as policies; the
/// deployment chooses via `OCR_DEFAULT_LANGUAGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePolicy {
    /// Reject requests that select no language
    Reject,
    /// Substitute this language when none is selected
    Fallback(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Upload log file path
    pub log_file: PathBuf,
    /// Tesseract binary name or path
    pub tesseract_binary: String,
    /// Empty-language-selection policy
    pub language_policy: LanguagePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_file: PathBuf::from("logs.json"),
            tesseract_binary: "tesseract".to_string(),
            language_policy: LanguagePolicy::Reject,
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `PORT`, `UPLOAD_LOG_FILE`, `TESSERACT_BIN`,
    /// `OCR_DEFAULT_LANGUAGE` (setting it switches the language policy
    /// from reject to fallback).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::InvalidValue {
                    var: "PORT",
                    message: format!("{}", e),
                })?;
        }
        if let Ok(path) = std::env::var("UPLOAD_LOG_FILE") {
            config.log_file = PathBuf::from(path);
        }
        if let Ok(binary) = std::env::var("TESSERACT_BIN") {
            config.tesseract_binary = binary;
        }
        if let Ok(language) = std::env::var("OCR_DEFAULT_LANGUAGE") {
            let language = language.trim().to_string();
            if language.is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "OCR_DEFAULT_LANGUAGE",
                    message: "must not be blank".to_string(),
                });
            }
            config.language_policy = LanguagePolicy::Fallback(language);
        }

        Ok(config)
    }
}
