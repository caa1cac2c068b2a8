//! Route mounting for the Spark endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use spark_core::RequestContext;
use spark_events::DispatchOutcome;
use spark_webhooks::SignedRequest;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::extractor::SignatureHeaders;
use crate::response::EventRejection;
use crate::state::SparkState;

/// Path of the descriptor endpoint.
pub const DESCRIPTOR_PATH: &str = "/plugin.json";

/// Path of the event endpoint.
pub const EVENTS_PATH: &str = "/events";

/// Creates an Axum router with the descriptor and event routes.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new().merge(spark_routes(state));
/// ```
pub fn spark_routes(state: SparkState) -> Router {
    Router::new()
        .route(DESCRIPTOR_PATH, get(descriptor_handler))
        .route(EVENTS_PATH, post(events_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn descriptor_handler(State(state): State<SparkState>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.descriptor.clone(),
    )
        .into_response()
}

async fn events_handler(
    State(state): State<SparkState>,
    headers: SignatureHeaders,
    body: Bytes,
) -> Response {
    let ctx = RequestContext::with_timeout(state.request_timeout);
    let span = tracing::info_span!("event", request_id = %ctx.request_id());

    async move {
        let request = SignedRequest::new(
            &body,
            headers.signature.as_deref(),
            headers.timestamp.as_deref(),
        );
        if let Err(err) = state.receiver.verify(&request) {
            tracing::warn!(reason = %err, "Rejected event signature");
            return EventRejection::from(err).into_response();
        }

        match state.dispatcher.dispatch(&ctx, &body).await {
            Ok(DispatchOutcome::Handled(Value::Null)) | Ok(DispatchOutcome::NoHandler) => {
                StatusCode::NO_CONTENT.into_response()
            }
            Ok(DispatchOutcome::Handled(response)) => {
                (StatusCode::OK, Json(response)).into_response()
            }
            Err(err) => {
                if let spark_events::DispatchError::InvalidPayload(reason) = &err {
                    tracing::debug!(%reason, "Rejected event payload");
                }
                EventRejection::from(&err).into_response()
            }
        }
    }
    .instrument(span)
    .await
}
