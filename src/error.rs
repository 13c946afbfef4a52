use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while talking to the upload backend.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No files selected for upload")]
    NoFiles,

    #[error("Image id must not be empty")]
    EmptyImageId,

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with {status}")]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Background runtime stopped before the request finished")]
    Runtime,
}

impl UploadError {
    /// Server supplied `detail` text, when the error body carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            UploadError::Server {
                detail: Some(detail),
                ..
            } => Some(detail.as_str()),
            _ => None,
        }
    }

    /// Text suitable for a notification: the server detail verbatim, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
