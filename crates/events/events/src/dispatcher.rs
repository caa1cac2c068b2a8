//! Routes parsed events to their registered handler.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use spark_core::RequestContext;

use crate::error::{DispatchError, DispatchResult};
use crate::event::Event;
use crate::registry::HandlerRegistry;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A handler ran and produced this response body.
    Handled(Value),
    /// No handler is registered for the event type.
    NoHandler,
}

/// Dispatches events against a frozen [`HandlerRegistry`].
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct EventDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl EventDispatcher {
    /// Takes ownership of the registry. No handlers can be added afterwards.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Parses a raw body and dispatches it by its `type` field.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        raw: &[u8],
    ) -> DispatchResult<DispatchOutcome> {
        let event = Event::parse(raw)?;
        self.dispatch_event(ctx, event).await
    }

    /// Dispatches an already parsed event.
    ///
    /// The handler is awaited until it completes or the context deadline
    /// passes, whichever comes first.
    pub async fn dispatch_event(
        &self,
        ctx: &RequestContext,
        event: Event,
    ) -> DispatchResult<DispatchOutcome> {
        let Some(handler) = self.registry.get(&event.event_type) else {
            tracing::debug!(event_type = %event.event_type, "No handler registered");
            return Ok(DispatchOutcome::NoHandler);
        };

        let event_type = event.event_type.clone();
        let start = Instant::now();
        let result = ctx.run(handler.handle(event, ctx.clone())).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(response)) => {
                tracing::debug!(event_type = %event_type, duration_ms, "Event handled");
                Ok(DispatchOutcome::Handled(response))
            }
            Ok(Err(error)) => {
                tracing::error!(
                    event_type = %event_type,
                    duration_ms,
                    error = %error,
                    "Event handler failed"
                );
                Err(DispatchError::Handler { event_type, error })
            }
            Err(_) => {
                tracing::warn!(
                    event_type = %event_type,
                    duration_ms,
                    "Event handler exceeded deadline"
                );
                Err(DispatchError::DeadlineExceeded(event_type))
            }
        }
    }
}
