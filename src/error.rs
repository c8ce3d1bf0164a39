use std::path::PathBuf;
use thiserror::Error;

/// Failures inside the ingest -> stage -> fan-out -> cleanup pipeline.
///
/// None of these is fatal to the process: callers log them and move on to
/// the next event.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Download of media {file_id} failed: {reason}")]
    Download { file_id: String, reason: String },

    #[error("Failed to write staged file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Delivery to chat {chat_id} failed: {reason}")]
    Delivery { chat_id: String, reason: String },

    #[error("Failed to delete staged file {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Telegram {method} failed: {description}")]
    Telegram { method: String, description: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn telegram(method: &str, description: impl Into<String>) -> Self {
        RelayError::Telegram {
            method: method.to_string(),
            description: description.into(),
        }
    }

    /// Whether the Bot API answered 429 (flood control).
    pub fn is_rate_limit(&self) -> bool {
        match self {
            RelayError::Telegram { description, .. } => description.contains("Too Many Requests"),
            RelayError::Http(e) => e.status().map(|s| s.as_u16() == 429).unwrap_or(false),
            _ => false,
        }
    }
}
