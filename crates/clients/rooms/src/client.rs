//! HTTP client for the room API.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use spark_core::RequestContext;
use spark_oauth::{ClientCredentials, TokenCache};

use crate::error::{RoomError, RoomResult};
use crate::types::EventData;

/// Scope requested for room API tokens.
pub const DEFAULT_SCOPE: &str = "rooms";

/// Client for sending and reading room events and state.
#[derive(Debug, Clone)]
pub struct RoomClient {
    base_url: String,
    http_client: Client,
    credentials: ClientCredentials,
    scope: String,
    tokens: Arc<TokenCache>,
}

impl RoomClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: ClientCredentials,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: Client::new(),
            credentials,
            scope: DEFAULT_SCOPE.to_string(),
            tokens,
        }
    }

    /// Sets the token scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Uses an existing HTTP client (and its connection pool).
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts a timeline event to a room.
    pub async fn send_event<T>(
        &self,
        ctx: &RequestContext,
        room_id: &str,
        event_type: &str,
        data: &T,
    ) -> RoomResult<()>
    where
        T: Serialize + ?Sized,
    {
        let url = format!(
            "{}/rooms/{}/send/{}",
            self.base_url,
            urlencoding::encode(room_id),
            urlencoding::encode(event_type)
        );
        tracing::debug!(room_id, event_type, "Sending room event");

        self.execute(ctx, |token| {
            self.http_client.post(&url).bearer_auth(token).json(data)
        })
        .await?;
        Ok(())
    }

    /// Sets a state event in a room.
    pub async fn update_state<T>(
        &self,
        ctx: &RequestContext,
        room_id: &str,
        event_type: &str,
        state_key: &str,
        data: &T,
    ) -> RoomResult<()>
    where
        T: Serialize + ?Sized,
    {
        let url = format!(
            "{}/rooms/{}/state/{}/{}",
            self.base_url,
            urlencoding::encode(room_id),
            urlencoding::encode(event_type),
            urlencoding::encode(state_key)
        );
        tracing::debug!(room_id, event_type, state_key, "Updating room state");

        self.execute(ctx, |token| {
            self.http_client.put(&url).bearer_auth(token).json(data)
        })
        .await?;
        Ok(())
    }

    /// Reads a single event from a room.
    pub async fn get_event(
        &self,
        ctx: &RequestContext,
        room_id: &str,
        event_id: &str,
    ) -> RoomResult<EventData> {
        let url = format!(
            "{}/rooms/{}/event/{}",
            self.base_url,
            urlencoding::encode(room_id),
            urlencoding::encode(event_id)
        );
        tracing::debug!(room_id, event_id, "Fetching room event");

        let response = self
            .execute(ctx, |token| self.http_client.get(&url).bearer_auth(token))
            .await?;

        ctx.run(response.json::<EventData>()).await?.map_err(RoomError::from)
    }

    /// Sends an authenticated request within the context deadline.
    ///
    /// A 401 means the cached token was revoked early; the token is
    /// dropped and the request retried once with a fresh one.
    async fn execute<F>(&self, ctx: &RequestContext, build: F) -> RoomResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        ctx.run(async {
            let response = self.send_with_token(ctx, &build).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return check_status(response).await;
            }

            tracing::debug!(scope = %self.scope, "Access token rejected, refreshing");
            self.tokens.invalidate(&self.credentials, &self.scope).await;
            let response = self.send_with_token(ctx, &build).await?;
            check_status(response).await
        })
        .await?
    }

    async fn send_with_token<F>(&self, ctx: &RequestContext, build: &F) -> RoomResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self
            .tokens
            .get_token(&self.credentials, &self.scope)
            .await?;

        Ok(build(token.secret())
            .timeout(ctx.remaining())
            .send()
            .await?)
    }
}

async fn check_status(response: Response) -> RoomResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "Room API request failed");
    Err(RoomError::Status {
        status: status.as_u16(),
        body,
    })
}
