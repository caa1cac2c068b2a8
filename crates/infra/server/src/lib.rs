//! # Spark Server
//!
//! Plugin runtime tying the pieces together: handlers are registered on a
//! [`Spark`] value during setup, then [`Spark::start`] freezes them and
//! serves the descriptor and event endpoints until Ctrl-C.
//!
//! ```rust,ignore
//! let mut spark = Spark::new(descriptor, "client-id", "client-secret");
//! let rooms = spark.rooms();
//! spark.message("ping", |_event, _ctx| async { Ok(json!({ "pong": true })) });
//! spark.start().await?;
//! ```

mod config;

pub use config::{load_config, ConfigError, SparkConfig, CONFIG_PATH_ENV};

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use spark_axum::{spark_routes, SparkState};
use spark_core::{CoreError, Descriptor, RequestContext};
use spark_events::{Event, EventDispatcher, EventHandler, HandlerError, HandlerRegistry};
use spark_oauth::{ClientCredentials, HttpTokenIssuer, TokenCache};
use spark_rooms::RoomClient;
use spark_webhooks::SignatureEnforcement;
use tokio::net::TcpListener;

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] CoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A Spark plugin: descriptor, handlers and outbound room client.
pub struct Spark {
    config: SparkConfig,
    descriptor: Descriptor,
    registry: HandlerRegistry,
    rooms: Arc<RoomClient>,
}

impl Spark {
    /// Creates a plugin with default configuration and the given client credentials.
    pub fn new(
        descriptor: Descriptor,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let config = SparkConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..SparkConfig::default()
        };
        Self::with_config(descriptor, config)
    }

    /// Creates a plugin from a full configuration.
    pub fn with_config(descriptor: Descriptor, config: SparkConfig) -> Self {
        let credentials = ClientCredentials::new(&config.client_id, &config.client_secret);
        let tokens = TokenCache::new(Arc::new(HttpTokenIssuer::new(&config.auth_url)))
            .with_ttl(config.token_ttl());
        let rooms = RoomClient::new(&config.api_url, credentials, Arc::new(tokens))
            .with_scope(&config.token_scope);

        Self {
            config,
            descriptor,
            registry: HandlerRegistry::new(),
            rooms: Arc::new(rooms),
        }
    }

    pub fn config(&self) -> &SparkConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Outbound room client, shareable with handlers.
    pub fn rooms(&self) -> Arc<RoomClient> {
        Arc::clone(&self.rooms)
    }

    /// Registers a closure for an event type. A later registration replaces it.
    pub fn message<F, Fut>(&mut self, event_type: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Event, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.registry.on(event_type, handler);
        self
    }

    /// Registers a handler value for an event type.
    pub fn handler(
        &mut self,
        event_type: impl Into<String>,
        handler: impl EventHandler + 'static,
    ) -> &mut Self {
        self.registry.register(event_type, handler);
        self
    }

    /// Freezes the handlers and builds the HTTP router.
    pub fn into_router(self) -> ServerResult<Router> {
        let receiver = self.config.receiver()?;
        if receiver.enforcement() == SignatureEnforcement::Optional {
            tracing::warn!("Signature verification is disabled; accepting unsigned events");
        }

        tracing::info!(
            plugin_id = self.descriptor.plugin_id(),
            handlers = ?self.registry.event_types(),
            "Registered event handlers"
        );

        let state = SparkState::new(
            &self.descriptor,
            receiver,
            EventDispatcher::new(self.registry),
        )?
        .with_request_timeout(self.config.request_timeout());

        Ok(spark_routes(state))
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn start(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an existing listener until `shutdown` completes.
    pub async fn serve<S>(self, listener: TcpListener, shutdown: S) -> ServerResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let router = self.into_router()?;
        tracing::info!(address = %listener.local_addr()?, "Spark plugin listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Spark plugin stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
