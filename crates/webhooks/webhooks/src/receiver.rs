//! Webhook receiver for verifying incoming webhooks.

use serde::{Deserialize, Serialize};

use crate::error::{WebhookError, WebhookResult};
use crate::signature::{now_millis, SignatureError, SignatureVerifier};

/// Whether inbound events must carry a valid signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureEnforcement {
    /// Every event is verified against the shared secret.
    #[default]
    Required,
    /// Events are accepted unsigned (development mode).
    Optional,
}

impl std::str::FromStr for SignatureEnforcement {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(SignatureEnforcement::Required),
            "optional" => Ok(SignatureEnforcement::Optional),
            other => Err(WebhookError::ConfigError(format!(
                "unknown signature enforcement '{other}', expected 'required' or 'optional'"
            ))),
        }
    }
}

/// Raw inbound request as seen by the receiver.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Body bytes exactly as received.
    pub body: &'a [u8],
    /// Value of the signature header, if present.
    pub signature: Option<&'a str>,
    /// Value of the timestamp header, if present.
    pub timestamp: Option<&'a str>,
}

impl<'a> SignedRequest<'a> {
    pub fn new(body: &'a [u8], signature: Option<&'a str>, timestamp: Option<&'a str>) -> Self {
        Self {
            body,
            signature,
            timestamp,
        }
    }

    /// Parses the timestamp header. Anything unusable fails closed.
    fn timestamp_millis(&self) -> Result<i64, SignatureError> {
        self.timestamp
            .and_then(|t| t.trim().parse::<i64>().ok())
            .ok_or(SignatureError::Invalid)
    }
}

/// Webhook receiver for verifying incoming webhooks.
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    enforcement: SignatureEnforcement,
    verifier: SignatureVerifier,
}

impl WebhookReceiver {
    /// Creates a receiver that requires signatures made with `secret`.
    pub fn required(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            enforcement: SignatureEnforcement::Required,
            verifier: SignatureVerifier::new(secret),
        }
    }

    /// Creates a receiver that accepts unsigned events.
    pub fn optional() -> Self {
        Self {
            enforcement: SignatureEnforcement::Optional,
            verifier: SignatureVerifier::unsigned(),
        }
    }

    /// Creates a receiver from configuration values.
    ///
    /// `Required` without a secret is rejected; `Optional` ignores any secret.
    pub fn from_config(
        enforcement: SignatureEnforcement,
        secret: Option<&str>,
    ) -> WebhookResult<Self> {
        match (enforcement, secret) {
            (SignatureEnforcement::Required, Some(secret)) if !secret.is_empty() => {
                Ok(Self::required(secret.as_bytes()))
            }
            (SignatureEnforcement::Required, _) => Err(WebhookError::ConfigError(
                "signature enforcement is 'required' but no signing secret is configured"
                    .to_string(),
            )),
            (SignatureEnforcement::Optional, _) => Ok(Self::optional()),
        }
    }

    /// Sets the freshness window.
    pub fn with_tolerance_ms(mut self, tolerance_ms: i64) -> Self {
        self.verifier = self.verifier.with_tolerance_ms(tolerance_ms);
        self
    }

    pub fn enforcement(&self) -> SignatureEnforcement {
        self.enforcement
    }

    /// Verifies a request against the current wall clock.
    pub fn verify(&self, request: &SignedRequest<'_>) -> Result<(), SignatureError> {
        self.verify_at(request, now_millis())
    }

    /// Verifies a request as if the current time were `now_millis`.
    pub fn verify_at(
        &self,
        request: &SignedRequest<'_>,
        now_millis: i64,
    ) -> Result<(), SignatureError> {
        if self.enforcement == SignatureEnforcement::Optional {
            return Ok(());
        }

        let timestamp = request.timestamp_millis()?;
        let signature = request.signature.ok_or(SignatureError::Invalid)?;

        self.verifier
            .verify_at(request.body, signature, timestamp, now_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{sign, DEFAULT_TOLERANCE_MS};

    const NOW: i64 = 1_700_000_000_000;

    fn signed(secret: &str, body: &[u8], timestamp: i64) -> (String, String) {
        (sign(secret.as_bytes(), timestamp, body), timestamp.to_string())
    }

    #[test]
    fn test_required_accepts_valid_request() {
        let receiver = WebhookReceiver::required("secret");
        let body = br#"{"type":"ping"}"#;
        let (signature, timestamp) = signed("secret", body, NOW);

        let request = SignedRequest::new(body, Some(signature.as_str()), Some(timestamp.as_str()));
        assert_eq!(receiver.verify_at(&request, NOW + 1_000), Ok(()));
    }

    #[test]
    fn test_missing_headers_fail_closed() {
        let receiver = WebhookReceiver::required("secret");
        let body = b"{}";
        let (signature, timestamp) = signed("secret", body, NOW);

        let no_signature = SignedRequest::new(body, None, Some(timestamp.as_str()));
        assert_eq!(receiver.verify_at(&no_signature, NOW), Err(SignatureError::Invalid));

        let no_timestamp = SignedRequest::new(body, Some(signature.as_str()), None);
        assert_eq!(receiver.verify_at(&no_timestamp, NOW), Err(SignatureError::Invalid));
    }

    #[test]
    fn test_unparseable_timestamp_is_invalid() {
        let receiver = WebhookReceiver::required("secret");
        let body = b"{}";
        let (signature, _) = signed("secret", body, NOW);

        for bad in ["", "soon", "1.7e12", "17000000000000000000000"] {
            let request = SignedRequest::new(body, Some(signature.as_str()), Some(bad));
            assert_eq!(
                receiver.verify_at(&request, NOW),
                Err(SignatureError::Invalid),
                "timestamp {bad:?}"
            );
        }
    }

    #[test]
    fn test_stale_request_is_expired() {
        let receiver = WebhookReceiver::required("secret");
        let body = b"{}";
        let (signature, timestamp) = signed("secret", body, NOW);

        let request = SignedRequest::new(body, Some(signature.as_str()), Some(timestamp.as_str()));
        assert_eq!(
            receiver.verify_at(&request, NOW + DEFAULT_TOLERANCE_MS + 1),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_optional_skips_verification() {
        let receiver = WebhookReceiver::optional();
        let request = SignedRequest::new(b"{}", None, None);
        assert_eq!(receiver.verify_at(&request, NOW), Ok(()));
        assert_eq!(receiver.enforcement(), SignatureEnforcement::Optional);
    }

    #[test]
    fn test_from_config() {
        assert!(WebhookReceiver::from_config(SignatureEnforcement::Required, None).is_err());
        assert!(WebhookReceiver::from_config(SignatureEnforcement::Required, Some("")).is_err());

        let receiver =
            WebhookReceiver::from_config(SignatureEnforcement::Optional, Some("ignored")).unwrap();
        assert_eq!(receiver.enforcement(), SignatureEnforcement::Optional);
    }

    #[test]
    fn test_enforcement_parsing() {
        assert_eq!(
            "Required".parse::<SignatureEnforcement>().unwrap(),
            SignatureEnforcement::Required
        );
        assert_eq!(
            " optional ".parse::<SignatureEnforcement>().unwrap(),
            SignatureEnforcement::Optional
        );
        assert!("sometimes".parse::<SignatureEnforcement>().is_err());
    }

    #[test]
    fn test_custom_tolerance() {
        let receiver = WebhookReceiver::required("secret").with_tolerance_ms(10);
        let body = b"{}";
        let (signature, timestamp) = signed("secret", body, NOW);
        let request = SignedRequest::new(body, Some(signature.as_str()), Some(timestamp.as_str()));
        assert_eq!(receiver.verify_at(&request, NOW + 10), Ok(()));
        assert_eq!(receiver.verify_at(&request, NOW + 11), Err(SignatureError::Expired));
    }
}
