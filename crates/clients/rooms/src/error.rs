//! Room client error types.

use spark_core::DeadlineExceeded;
use spark_oauth::AuthError;
use thiserror::Error;

/// Result type for room API calls.
pub type RoomResult<T> = Result<T, RoomError>;

/// Error type for room API calls.
#[derive(Debug, Error)]
pub enum RoomError {
    /// No access token could be obtained.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The request could not be sent or the connection failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("Room API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The inbound request's deadline passed first.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

impl From<reqwest::Error> for RoomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RoomError::Decode(err.to_string())
        } else if err.is_timeout() {
            RoomError::DeadlineExceeded
        } else {
            RoomError::Transport(err.to_string())
        }
    }
}

impl From<DeadlineExceeded> for RoomError {
    fn from(_: DeadlineExceeded) -> Self {
        RoomError::DeadlineExceeded
    }
}
