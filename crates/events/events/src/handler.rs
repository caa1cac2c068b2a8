//! Event handler trait and types.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;
use spark_core::RequestContext;

use crate::error::HandlerError;
use crate::event::Event;

/// Trait for event handlers.
///
/// The returned value becomes the HTTP response body. Returning
/// `Value::Null` answers with an empty 204.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles an event.
    ///
    /// `ctx` carries the request deadline; pass it to outbound calls.
    async fn handle(&self, event: Event, ctx: RequestContext) -> Result<Value, HandlerError>;
}

/// Wrapper for closure-based handlers.
pub struct FnHandler<F> {
    handler: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event, RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn handle(&self, event: Event, ctx: RequestContext) -> Result<Value, HandlerError> {
        (self.handler)(event, ctx).await
    }
}
