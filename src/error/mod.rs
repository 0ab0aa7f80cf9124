//! Error types for Superinterface.

pub mod category;

pub use category::ErrorCategory;

use thiserror::Error;

/// Primary error type for all Superinterface operations.
#[derive(Error, Debug)]
pub enum SuperinterfaceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Microphone permission denied or the capture device failed.
    #[error("Media device error: {0}")]
    MediaDevice(String),

    /// Peer connection negotiation or SDP exchange failed.
    #[error("Signaling error: {0}")]
    Signaling(String),

    #[error("Data channel error: {0}")]
    DataChannel(String),

    /// One NDJSON line could not be parsed. The stream continues.
    #[error("Malformed record {line:?}: {source}")]
    MalformedRecord {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Visualization unavailable: {0}")]
    Visualization(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SuperinterfaceError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MediaDevice(_) => ErrorCategory::Device,
            Self::Signaling(_) | Self::DataChannel(_) => ErrorCategory::Signaling,
            Self::Api { .. } => ErrorCategory::Signaling,
            Self::MalformedRecord { .. } => ErrorCategory::Record,
            Self::Visualization(_) => ErrorCategory::Visualization,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::InvalidArgument(_) | Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error ends the current session attempt.
    ///
    /// Malformed records and analyser failures are isolated and never end a
    /// session.
    pub fn is_session_fatal(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Record | ErrorCategory::Visualization
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SuperinterfaceError>;
