//! Webhook error types.

use thiserror::Error;

/// Result type for webhook setup.
pub type WebhookResult<T> = Result<T, WebhookError>;

/// Error raised while configuring signature verification.
///
/// Verification failures themselves are [`crate::SignatureError`].
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
