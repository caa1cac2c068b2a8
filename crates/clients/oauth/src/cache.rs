//! Per-credential token cache with TTL expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::error::{AuthError, AuthResult};
use crate::issuer::{AccessToken, ClientCredentials, TokenIssuer};

/// Default lifetime of a cached token, matching the issuer's short-lived tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(500);

/// Longest lifetime a cached token is given, about thirty years.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Cache key. The secret is stored as a digest, never in clear.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    client_id: String,
    secret_digest: Vec<u8>,
    scope: String,
}

impl CacheKey {
    fn new(credentials: &ClientCredentials, scope: &str) -> Self {
        Self {
            client_id: credentials.client_id().to_string(),
            secret_digest: Sha256::digest(credentials.client_secret().as_bytes()).to_vec(),
            scope: scope.to_string(),
        }
    }
}

/// A token and the instant it stops being served.
#[derive(Debug)]
struct CachedToken {
    token: AccessToken,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// One key's entry.
///
/// The mutex is held across the issuer call so that concurrent misses for
/// the key wait for that call instead of repeating it. `attempts` counts
/// finished issuer calls: a waiter that sees it move while queued shares
/// the outcome of the call it waited on, including a failure.
#[derive(Debug, Default)]
struct Slot {
    attempts: AtomicU64,
    state: Mutex<SlotState>,
}

#[derive(Debug, Default)]
struct SlotState {
    token: Option<Arc<CachedToken>>,
    /// Error of the latest issuer call, only handed to callers that were
    /// already waiting when it finished.
    last_error: Option<AuthError>,
}

/// Caches client-credentials tokens per (client id, secret, scope).
pub struct TokenCache {
    issuer: Arc<dyn TokenIssuer>,
    ttl: Duration,
    slots: RwLock<HashMap<CacheKey, Arc<Slot>>>,
}

impl TokenCache {
    /// Creates a cache with the default TTL.
    pub fn new(issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            issuer,
            ttl: DEFAULT_TOKEN_TTL,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the TTL applied to newly issued tokens.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a valid token, calling the issuer only on a miss or expiry.
    ///
    /// Callers queued behind a failing issuer call get its error instead of
    /// calling again. The failure is never cached: a call arriving after it
    /// finished asks the issuer again.
    pub async fn get_token(
        &self,
        credentials: &ClientCredentials,
        scope: &str,
    ) -> AuthResult<AccessToken> {
        let slot = self.slot(CacheKey::new(credentials, scope)).await;
        let seen = slot.attempts.load(Ordering::Acquire);
        let mut state = slot.state.lock().await;

        if let Some(cached) = state.token.as_ref().filter(|c| c.is_fresh(Instant::now())) {
            tracing::debug!(client_id = credentials.client_id(), scope, "Token cache hit");
            return Ok(cached.token.clone());
        }

        if slot.attempts.load(Ordering::Acquire) != seen {
            if let Some(err) = &state.last_error {
                tracing::debug!(
                    client_id = credentials.client_id(),
                    scope,
                    "Sharing failed token request"
                );
                return Err(err.clone());
            }
        }

        tracing::debug!(client_id = credentials.client_id(), scope, "Requesting access token");
        let result = self.issuer.issue(credentials, scope).await;
        slot.attempts.fetch_add(1, Ordering::AcqRel);

        let token = match result {
            Ok(token) => token,
            Err(err) => {
                state.last_error = Some(err.clone());
                return Err(err);
            }
        };

        // An issuer-reported lifetime shorter than the TTL wins.
        let lifetime = token
            .expires_in()
            .map_or(self.ttl, |expires_in| expires_in.min(self.ttl));

        state.last_error = None;
        state.token = Some(Arc::new(CachedToken {
            token: token.clone(),
            expires_at: expires_at(Instant::now(), lifetime),
        }));

        Ok(token)
    }

    /// Drops the cached token for a key, e.g. after the API rejected it.
    pub async fn invalidate(&self, credentials: &ClientCredentials, scope: &str) {
        let key = CacheKey::new(credentials, scope);
        let slot = self.slots.read().await.get(&key).cloned();
        if let Some(slot) = slot {
            slot.state.lock().await.token = None;
        }
    }

    /// Removes expired entries that no caller is using. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut slots = self.slots.write().await;
        purge_idle(&mut slots, Instant::now())
    }

    /// Number of keys currently tracked.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, key: CacheKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().await.get(&key) {
            return slot.clone();
        }

        let mut slots = self.slots.write().await;
        if !slots.contains_key(&key) {
            purge_idle(&mut slots, Instant::now());
        }
        slots.entry(key).or_default().clone()
    }
}

/// Removes slots holding no fresh token and referenced only by the map.
///
/// Callers hold the map's write lock, so no new references can appear
/// while this runs.
fn purge_idle(slots: &mut HashMap<CacheKey, Arc<Slot>>, now: Instant) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| {
        if Arc::strong_count(slot) > 1 {
            return true;
        }
        match slot.state.try_lock() {
            Ok(state) => state.token.as_ref().is_some_and(|c| c.is_fresh(now)),
            Err(_) => true,
        }
    });
    before - slots.len()
}

/// Expiry instant for a lifetime, clamped to [`MAX_TOKEN_TTL`].
fn expires_at(now: Instant, lifetime: Duration) -> Instant {
    now.checked_add(lifetime.min(MAX_TOKEN_TTL)).unwrap_or(now)
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").field("ttl", &self.ttl).finish()
    }
}
