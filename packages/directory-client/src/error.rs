//! Error types for the directory client.

use thiserror::Error;

/// Result type for directory client operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory client errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Network error (connection failed, timeout, body could not be read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the directory
    #[error("directory returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not JSON, or not a JSON array of participants
    #[error("malformed directory response: {0}")]
    MalformedResponse(String),
}

impl DirectoryError {
    /// True for failures that happened before a usable body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
