//! HMAC signature generation and verification.
//!
//! The platform signs `ascii(timestamp_millis) + ":" + body` with
//! HMAC-SHA256 and sends the base64-encoded MAC alongside the timestamp.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signature, in milliseconds.
pub const DEFAULT_TOLERANCE_MS: i64 = 600_000;

/// Signature verification errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Missing, malformed or mismatched signature, or unusable timestamp.
    #[error("Invalid signature")]
    Invalid,
    /// Authentic signature older than the freshness window.
    #[error("Signature expired")]
    Expired,
}

/// Verifier bound to a shared secret and freshness window.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<Vec<u8>>,
    tolerance_ms: i64,
}

impl SignatureVerifier {
    /// Creates a verifier for the given secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Some(secret.into()),
            tolerance_ms: DEFAULT_TOLERANCE_MS,
        }
    }

    /// Creates a verifier that accepts every request.
    pub fn unsigned() -> Self {
        Self {
            secret: None,
            tolerance_ms: DEFAULT_TOLERANCE_MS,
        }
    }

    /// Sets the freshness window.
    pub fn with_tolerance_ms(mut self, tolerance_ms: i64) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// Verifies against the current wall clock.
    pub fn verify(
        &self,
        body: &[u8],
        signature_b64: &str,
        timestamp_millis: i64,
    ) -> Result<(), SignatureError> {
        self.verify_at(body, signature_b64, timestamp_millis, now_millis())
    }

    /// Verifies as if the current time were `now_millis`.
    pub fn verify_at(
        &self,
        body: &[u8],
        signature_b64: &str,
        timestamp_millis: i64,
        now_millis: i64,
    ) -> Result<(), SignatureError> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let provided = STANDARD
            .decode(signature_b64.trim())
            .map_err(|_| SignatureError::Invalid)?;

        // verify_slice compares in constant time
        mac(secret, timestamp_millis, body)
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Invalid)?;

        let age_ms = now_millis.saturating_sub(timestamp_millis);
        if age_ms > self.tolerance_ms {
            tracing::debug!(
                age_ms,
                tolerance_ms = self.tolerance_ms,
                "Signature outside freshness window"
            );
            return Err(SignatureError::Expired);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("tolerance_ms", &self.tolerance_ms)
            .finish()
    }
}

/// Generates the base64 signature header value for a body and timestamp.
pub fn sign(secret: &[u8], timestamp_millis: i64, body: &[u8]) -> String {
    STANDARD.encode(mac(secret, timestamp_millis, body).finalize().into_bytes())
}

/// Verifies a signature with the default freshness window.
///
/// An absent secret means the platform runs unsigned and the call succeeds.
pub fn verify(
    body: &[u8],
    signature_b64: &str,
    timestamp_millis: i64,
    secret: Option<&[u8]>,
) -> Result<(), SignatureError> {
    verify_at(body, signature_b64, timestamp_millis, secret, now_millis())
}

/// Like [`verify`] with an explicit clock.
pub fn verify_at(
    body: &[u8],
    signature_b64: &str,
    timestamp_millis: i64,
    secret: Option<&[u8]>,
    now_millis: i64,
) -> Result<(), SignatureError> {
    let verifier = match secret {
        Some(secret) => SignatureVerifier::new(secret),
        None => SignatureVerifier::unsigned(),
    };
    verifier.verify_at(body, signature_b64, timestamp_millis, now_millis)
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn mac(secret: &[u8], timestamp_millis: i64, body: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");

    // Sign: timestamp:payload
    mac.update(timestamp_millis.to_string().as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}
