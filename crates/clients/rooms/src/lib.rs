//! # Spark Rooms
//!
//! Outbound client for the platform's room API. Handlers use it to post
//! events, update room state and read events back. Every call is
//! authenticated with a cached client-credentials token and bounded by
//! the inbound request's deadline.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spark_rooms::RoomClient;
//!
//! let rooms = RoomClient::new("https://api.example.com", credentials, token_cache);
//! rooms
//!     .send_event(&ctx, "!room:example.org", "m.room.message", &json!({ "body": "hi" }))
//!     .await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{RoomClient, DEFAULT_SCOPE};
pub use error::{RoomError, RoomResult};
pub use types::EventData;
