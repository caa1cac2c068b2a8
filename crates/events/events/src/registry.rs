//! Handler registry, populated during setup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use spark_core::RequestContext;

use crate::error::HandlerError;
use crate::event::Event;
use crate::handler::{EventHandler, FnHandler};

/// Maps each event type to exactly one handler.
///
/// Registration takes `&mut self`; once the registry is handed to an
/// [`EventDispatcher`](crate::EventDispatcher) it can no longer change.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `event_type`, replacing any earlier one.
    pub fn register(
        &mut self,
        event_type: impl Into<String>,
        handler: impl EventHandler + 'static,
    ) -> &mut Self {
        let event_type = event_type.into();
        if self
            .handlers
            .insert(event_type.clone(), Arc::new(handler))
            .is_some()
        {
            tracing::debug!(event_type = %event_type, "Replaced existing event handler");
        } else {
            tracing::debug!(event_type = %event_type, "Registered event handler");
        }
        self
    }

    /// Registers a closure as the handler for `event_type`.
    pub fn on<F, Fut>(&mut self, event_type: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Event, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.register(event_type, FnHandler::new(handler))
    }

    /// Gets the handler for an event type.
    pub fn get(&self, event_type: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(event_type).cloned()
    }

    /// Checks if a handler is registered for the event type.
    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Returns the registered event types.
    pub fn event_types(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Checks if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_registration() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry
            .on("ping", |_event, _ctx| async { Ok(Value::Null) })
            .on("room.message", |_event, _ctx| async { Ok(Value::Null) });

        assert!(registry.contains("ping"));
        assert!(registry.contains("room.message"));
        assert!(!registry.contains("room.join"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregistration_keeps_single_entry() {
        let mut registry = HandlerRegistry::new();
        registry.on("ping", |_event, _ctx| async { Ok(Value::from(1)) });
        registry.on("ping", |_event, _ctx| async { Ok(Value::from(2)) });

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.event_types(), vec!["ping"]);
    }
}
