//! Error types for the client.

use std::path::PathBuf;

use crate::session::CapabilityMode;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Submit or attach preconditions that were not met.
///
/// These never reach the backend; the session surfaces them as a transient
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a question is required in quick mode")]
    EmptyQuestion,

    #[error("text, a document or a voice note is required")]
    MissingInput,

    #[error("attachments are not accepted in {mode} mode")]
    AttachmentsNotAllowed { mode: CapabilityMode },

    #[error("a request is already in flight")]
    RequestInFlight,
}

/// Failures talking to the analysis backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Non-2xx response. `detail` is what the backend said, or a generic message.
    #[error("{detail}")]
    Status { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid attachment '{file_name}': {reason}")]
    Attachment { file_name: String, reason: String },
}

impl TransportError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
