//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Build the shared upstream client and relay components
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::RelayConfig;
use crate::demo::DemoChat;
use crate::http::handlers::{relay_chat, test_chat, welcome};
use crate::http::request::UuidRequestId;
use crate::relay::{RelayOrchestrator, UpstreamClient};

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid URL for {field}: {source}")]
    Url {
        field: &'static str,
        source: url::ParseError,
    },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayOrchestrator>,
    pub demo_chat: Option<Arc<DemoChat>>,
}

impl AppState {
    /// Build the relay and demo chat from configuration, sharing one
    /// pooled upstream client between them.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.upstream)?;

        let completions_url =
            Url::parse(&config.upstream.completions_url).map_err(|source| ServerError::Url {
                field: "upstream.completions_url",
                source,
            })?;
        let relay = RelayOrchestrator::new(
            upstream.clone(),
            completions_url,
            config.persona.instruction.clone(),
            config.persona.require_credential,
        );

        let demo_chat = if config.demo_chat.enabled {
            let chat = DemoChat::from_config(upstream, &config.demo_chat).map_err(|source| {
                ServerError::Url {
                    field: "demo_chat.completions_url",
                    source,
                }
            })?;
            Some(Arc::new(chat))
        } else {
            None
        };

        Ok(Self {
            relay: Arc::new(relay),
            demo_chat,
        })
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(welcome).post(relay_chat))
            .route("/test/chat", get(test_chat))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Router with all layers, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.completions_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
