//! Error types for snapmon.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snapmon operations.
pub type Result<T> = std::result::Result<T, SnapmonError>;

/// Main error type for snapmon.
#[derive(Error, Debug)]
pub enum SnapmonError {
    // Device API errors
    #[error("Failed to reach device at {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    // Processing errors
    #[error("Internal error: {0}")]
    Internal(String),

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapmonError {
    /// Short label used for failure metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
            Self::Internal(_) => "internal",
            Self::InvalidConfig { .. } => "config",
            Self::Io { .. } => "io",
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
