//! Runtime configuration.
//!
//! Values come from [`SparkConfig::default`], then an optional TOML file,
//! then `SPARK_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spark_webhooks::{SignatureEnforcement, WebhookError, WebhookReceiver};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "SPARK_CONFIG";

/// Plugin runtime configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Shared secret for inbound event signatures.
    pub signing_secret: Option<String>,
    /// Explicit enforcement mode. Derived from `signing_secret` when unset.
    pub signature_enforcement: Option<SignatureEnforcement>,
    /// Base URL of the token issuer.
    pub auth_url: String,
    /// Base URL of the room API.
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Scope requested for room API tokens.
    pub token_scope: String,
    /// Token cache TTL in seconds.
    pub token_ttl_secs: u64,
    /// Deadline for handling one inbound event, in seconds.
    pub request_timeout_secs: u64,
    /// Descriptor JSON file used by the binary.
    pub descriptor: Option<PathBuf>,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            signing_secret: None,
            signature_enforcement: None,
            auth_url: "http://localhost:8080/auth".to_string(),
            api_url: "http://localhost:8080/api".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            token_scope: spark_rooms::DEFAULT_SCOPE.to_string(),
            token_ttl_secs: spark_oauth::DEFAULT_TOKEN_TTL.as_secs(),
            request_timeout_secs: spark_axum::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            descriptor: None,
            log_level: "info".to_string(),
        }
    }
}

impl SparkConfig {
    /// Loads the file named by `SPARK_CONFIG` (if any) and applies
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => load_config(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `SPARK_*` overrides read through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SPARK_HOST") {
            self.host = host;
        }
        if let Some(port) = get("SPARK_PORT").or_else(|| get("PORT")) {
            self.port = parse("SPARK_PORT", &port)?;
        }
        if let Some(secret) = get("SPARK_SIGNING_SECRET") {
            self.signing_secret = Some(secret);
        }
        if let Some(mode) = get("SPARK_SIGNATURE_ENFORCEMENT") {
            self.signature_enforcement = Some(mode.parse()?);
        }
        if let Some(url) = get("SPARK_AUTH_URL") {
            self.auth_url = url;
        }
        if let Some(url) = get("SPARK_API_URL") {
            self.api_url = url;
        }
        if let Some(client_id) = get("SPARK_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Some(client_secret) = get("SPARK_CLIENT_SECRET") {
            self.client_secret = client_secret;
        }
        if let Some(scope) = get("SPARK_TOKEN_SCOPE") {
            self.token_scope = scope;
        }
        if let Some(ttl) = get("SPARK_TOKEN_TTL_SECS") {
            self.token_ttl_secs = parse("SPARK_TOKEN_TTL_SECS", &ttl)?;
        }
        if let Some(timeout) = get("SPARK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse("SPARK_REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(path) = get("SPARK_DESCRIPTOR") {
            self.descriptor = Some(PathBuf::from(path));
        }
        if let Some(level) = get("SPARK_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    /// The effective enforcement mode.
    pub fn enforcement(&self) -> SignatureEnforcement {
        self.signature_enforcement.unwrap_or_else(|| {
            if self.signing_secret.as_deref().is_some_and(|s| !s.is_empty()) {
                SignatureEnforcement::Required
            } else {
                SignatureEnforcement::Optional
            }
        })
    }

    /// Builds the inbound signature receiver.
    pub fn receiver(&self) -> Result<WebhookReceiver, ConfigError> {
        Ok(WebhookReceiver::from_config(
            self.enforcement(),
            self.signing_secret.as_deref(),
        )?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Debug for SparkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparkConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "<redacted>"))
            .field("signature_enforcement", &self.signature_enforcement)
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_scope", &self.token_scope)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("descriptor", &self.descriptor)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Loads configuration from a TOML file. Missing keys keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<SparkConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error(transparent)]
    Signature(#[from] WebhookError),
}
