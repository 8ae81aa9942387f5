use std::io;
use thiserror::Error;

/// Error type for the livegrab library
#[derive(Error, Debug)]
pub enum LivegrabError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Invalid source: {0}")]
    InvalidSource(String),
}

/// Result type alias for livegrab
pub type Result<T> = std::result::Result<T, LivegrabError>;

impl LivegrabError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        LivegrabError::Config(msg.into())
    }

    /// Create a transcode error
    pub fn transcode<S: Into<String>>(msg: S) -> Self {
        LivegrabError::Transcode(msg.into())
    }

    pub fn notify<S: Into<String>>(msg: S) -> Self {
        LivegrabError::Notify(msg.into())
    }

    pub fn invalid_source<S: Into<String>>(msg: S) -> Self {
        LivegrabError::InvalidSource(msg.into())
    }
}
