//! # Spark Webhooks
//!
//! Verification of inbound platform webhooks:
//! - HMAC-SHA256 signatures over `timestamp:body`
//! - Constant-time signature comparison
//! - Ten minute freshness window
//! - Explicit enforcement mode for unsigned development setups
//!
//! ## Example
//!
//! ```rust,ignore
//! use spark_webhooks::{SignedRequest, WebhookReceiver};
//!
//! let receiver = WebhookReceiver::required("shared-secret");
//! let request = SignedRequest::new(body, signature_header, timestamp_header);
//! receiver.verify(&request)?;
//! ```

mod error;
mod receiver;
mod signature;

pub use error::{WebhookError, WebhookResult};
pub use receiver::{SignatureEnforcement, SignedRequest, WebhookReceiver};
pub use signature::{
    sign, verify, verify_at, SignatureError, SignatureVerifier, DEFAULT_TOLERANCE_MS,
};

/// Header carrying the base64 HMAC signature.
pub const SIGNATURE_HEADER: &str = "x-signature-sha256";

/// Header carrying the signing timestamp in epoch milliseconds.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";
