//! # Spark OAuth
//!
//! Client-credentials access tokens for outbound platform calls.
//!
//! [`TokenCache`] keeps one token per (client id, client secret, scope)
//! and asks its [`TokenIssuer`] for a new one only when the cached token
//! is missing or expired. Concurrent misses for the same key share a
//! single issuer call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spark_oauth::{ClientCredentials, HttpTokenIssuer, TokenCache};
//!
//! let issuer = HttpTokenIssuer::new("https://auth.example.com");
//! let cache = TokenCache::new(Arc::new(issuer));
//! let credentials = ClientCredentials::new("client-id", "client-secret");
//! let token = cache.get_token(&credentials, "rooms").await?;
//! ```

mod cache;
mod error;
mod issuer;

pub use cache::{TokenCache, DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL};
pub use error::{AuthError, AuthResult};
pub use issuer::{AccessToken, ClientCredentials, HttpTokenIssuer, TokenIssuer};
