//! Error responses for the event endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use spark_events::DispatchError;
use spark_webhooks::SignatureError;

/// Why an inbound event was not answered with a handler result.
///
/// Bodies are fixed strings so verification internals and handler
/// errors never reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRejection {
    /// Bad, missing or expired signature.
    SignatureInvalid,
    /// Body is not a JSON object with a string `type`.
    InvalidPayload,
    /// The handler returned an error.
    HandlerFailed,
    /// The handler did not finish before the request deadline.
    DeadlineExceeded,
}

impl EventRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            EventRejection::SignatureInvalid => StatusCode::UNAUTHORIZED,
            EventRejection::InvalidPayload => StatusCode::BAD_REQUEST,
            EventRejection::HandlerFailed => StatusCode::INTERNAL_SERVER_ERROR,
            EventRejection::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EventRejection::SignatureInvalid => "signature invalid",
            EventRejection::InvalidPayload => "invalid payload",
            EventRejection::HandlerFailed => "handler failed",
            EventRejection::DeadlineExceeded => "handler timed out",
        }
    }
}

impl From<SignatureError> for EventRejection {
    fn from(_: SignatureError) -> Self {
        // Expired and invalid look the same from outside.
        EventRejection::SignatureInvalid
    }
}

impl From<&DispatchError> for EventRejection {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::InvalidPayload(_) => EventRejection::InvalidPayload,
            DispatchError::Handler { .. } => EventRejection::HandlerFailed,
            DispatchError::DeadlineExceeded(_) => EventRejection::DeadlineExceeded,
        }
    }
}

impl IntoResponse for EventRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}
