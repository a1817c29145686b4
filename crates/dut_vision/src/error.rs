/// Error types for keyword actions
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeywordError {
    /// A DUT section, resource file, or resource key is missing.
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    /// Expected UI text, OCR token, or image element is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Best template-match score fell below the caller's threshold.
    #[error("Image match failed: score={score:.3} < threshold={threshold:.3}")]
    MatchBelowThreshold { score: f64, threshold: f64 },

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, KeywordError>;
