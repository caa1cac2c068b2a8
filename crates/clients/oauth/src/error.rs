//! OAuth error types.

use thiserror::Error;

/// Result type for token operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Token issuance failed.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The issuer answered with a non-success status.
    #[error("Token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The issuer response could not be decoded.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The request timed out.
    #[error("Token request timed out")]
    Timeout,
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else if err.is_decode() {
            AuthError::InvalidResponse(err.to_string())
        } else {
            AuthError::HttpError(err.to_string())
        }
    }
}
