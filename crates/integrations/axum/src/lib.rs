//! # Spark Axum
//!
//! HTTP surface of a Spark plugin:
//!
//! - `GET /plugin.json` serves the plugin descriptor
//! - `POST /events` verifies the webhook signature, then dispatches the
//!   event to its handler
//!
//! ## Example
//!
//! ```rust,ignore
//! let state = SparkState::new(&descriptor, receiver, dispatcher)?;
//! let app = spark_routes(state);
//! axum::serve(listener, app).await?;
//! ```

mod extractor;
mod response;
mod routes;
mod state;

pub use extractor::SignatureHeaders;
pub use response::EventRejection;
pub use routes::{spark_routes, DESCRIPTOR_PATH, EVENTS_PATH};
pub use state::{SparkState, DEFAULT_REQUEST_TIMEOUT};
