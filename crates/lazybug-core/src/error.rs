//! Error types for lazybug-core

use thiserror::Error;

/// Result type alias using lazybug-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lazybug-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Store I/O failed (read, write, or the store worker is gone)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A record could not be turned into a wire message
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The compressor produced no output or exceeded the payload limit
    #[error("Compression error: {0}")]
    Compression(String),

    /// Transport-level failure (timeout, DNS, TLS, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The collection endpoint answered with a non-2xx status
    #[error("API error: HTTP {status}")]
    Api { status: u16 },

    /// Cancellation was observed before the operation could proceed
    #[error("Operation cancelled")]
    Cancelled,

    /// A background job panicked or was aborted
    #[error("Background job failed: {0}")]
    Job(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a later sync run may succeed where this one failed.
    ///
    /// Every non-2xx status is treated the same way; permanent client errors
    /// are not singled out.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence(_) | Self::Network(_) | Self::Api { .. } | Self::Job(_) | Self::Io(_)
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Persistence(error.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(error: bincode::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
