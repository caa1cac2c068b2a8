//! # Spark Events
//!
//! Routing of verified platform events to plugin handlers:
//! - One handler per event `type`, registered before serving
//! - Async handlers bounded by the request deadline
//! - A distinct "no handler" outcome for unregistered types
//!
//! ## Example
//!
//! ```rust,ignore
//! use spark_events::{EventDispatcher, HandlerRegistry, DispatchOutcome};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.on("ping", |_event, _ctx| async move {
//!     Ok(serde_json::json!({ "pong": true }))
//! });
//!
//! let dispatcher = EventDispatcher::new(registry);
//! let outcome = dispatcher.dispatch(&ctx, br#"{"type":"ping"}"#).await?;
//! ```

mod dispatcher;
mod error;
mod event;
mod handler;
mod registry;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use error::{DispatchError, DispatchResult, HandlerError};
pub use event::Event;
pub use handler::{EventHandler, FnHandler};
pub use registry::HandlerRegistry;
