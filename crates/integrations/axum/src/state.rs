//! Shared state for the Spark routes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use spark_core::{CoreResult, Descriptor};
use spark_events::EventDispatcher;
use spark_webhooks::WebhookReceiver;

/// Deadline applied to each inbound event unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state for the Spark routes.
#[derive(Clone)]
pub struct SparkState {
    /// Descriptor JSON, encoded once.
    pub(crate) descriptor: Bytes,
    pub(crate) receiver: Arc<WebhookReceiver>,
    pub(crate) dispatcher: EventDispatcher,
    pub(crate) request_timeout: Duration,
}

impl SparkState {
    pub fn new(
        descriptor: &Descriptor,
        receiver: WebhookReceiver,
        dispatcher: EventDispatcher,
    ) -> CoreResult<Self> {
        Ok(Self {
            descriptor: Bytes::from(descriptor.to_json_bytes()?),
            receiver: Arc::new(receiver),
            dispatcher,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Sets the per-request handling deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
