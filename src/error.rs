//! Error types for Nekos API operations.

use thiserror::Error;

/// Errors that can occur during Nekos API operations.
#[derive(Debug, Error)]
pub enum NekosError {
    /// Client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A typed query helper was given a value the API rejects.
    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// URL parsing error while building a request.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The call was cancelled through its cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// Reading the response body failed.
    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// Writing to, finalizing or discarding a download sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A binary download answered with something other than `200 OK`.
    #[error("bad status: {}", status_line(.status, .status_text))]
    BadStatus { status: u16, status_text: String },
}

impl NekosError {
    /// Returns true if this is a non-200 answer from the download path.
    pub fn is_bad_status(&self) -> bool {
        matches!(self, NekosError::BadStatus { .. })
    }

    /// Returns true if the call was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NekosError::Cancelled)
    }

    /// HTTP status text carried by a [`NekosError::BadStatus`], e.g. `404 Not Found`.
    pub fn status_text(&self) -> Option<String> {
        match self {
            NekosError::BadStatus {
                status,
                status_text,
            } => Some(status_line(status, status_text)),
            _ => None,
        }
    }
}

/// `404 Not Found`, or just `599` when the code has no reason phrase.
fn status_line(status: &u16, reason: &str) -> String {
    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}

/// Result type alias for Nekos API operations.
pub type Result<T> = core::result::Result<T, NekosError>;
