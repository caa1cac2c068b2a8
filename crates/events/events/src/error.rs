//! Dispatch error types.

use std::fmt;

use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Error type for event dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body is not JSON or has no string `type` field.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The registered handler returned an error.
    #[error("Handler for '{event_type}' failed: {error}")]
    Handler {
        event_type: String,
        error: HandlerError,
    },

    /// The handler did not finish before the request deadline.
    #[error("Handler for '{0}' exceeded the request deadline")]
    DeadlineExceeded(String),
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::InvalidPayload(err.to_string())
    }
}

/// Error raised by a plugin handler.
///
/// Any `std::error::Error` converts into it, so handlers can use `?` on
/// outbound client results directly.
pub struct HandlerError {
    inner: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl HandlerError {
    /// Creates an error from a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self {
            inner: message.to_string().into(),
        }
    }

    /// Returns the underlying error if it is of type `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self {
            inner: Box::new(err),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
