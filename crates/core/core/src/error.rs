//! Error types for Spark core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading or encoding a descriptor.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The descriptor file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The descriptor is not valid JSON or lacks required fields.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidDescriptor(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}
