//! Token issuer trait and the HTTP client-credentials implementation.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

/// OAuth2 client id and secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Access token returned by the issuer.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    token_type: String,
    expires_in: Option<Duration>,
    scope: Option<String>,
}

impl AccessToken {
    /// Creates a bearer token with no reported lifetime.
    pub fn bearer(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_type: "Bearer".to_string(),
            expires_in: None,
            scope: None,
        }
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// The raw token value for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime reported by the issuer, if any.
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Source of client-credentials tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Exchanges client credentials for an access token.
    async fn issue(&self, credentials: &ClientCredentials, scope: &str)
        -> AuthResult<AccessToken>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

/// Issues tokens with `POST {base_url}/token`.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    base_url: String,
    http_client: Client,
}

impl HttpTokenIssuer {
    const TOKEN_PATH: &'static str = "/token";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Uses an existing HTTP client (and its connection pool).
    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, Self::TOKEN_PATH)
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(
        &self,
        credentials: &ClientCredentials,
        scope: &str,
    ) -> AuthResult<AccessToken> {
        let mut params = HashMap::new();
        params.insert("grant_type", "client_credentials");
        params.insert("client_id", credentials.client_id());
        params.insert("scope", scope);

        let response = self
            .http_client
            .post(self.token_url())
            .basic_auth(credentials.client_id(), Some(credentials.client_secret()))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                client_id = credentials.client_id(),
                "Token request rejected"
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            secret: token_response.access_token,
            token_type: token_response
                .token_type
                .unwrap_or_else(|| "Bearer".to_string()),
            expires_in: token_response.expires_in.map(Duration::from_secs),
            scope: token_response.scope,
        })
    }
}
