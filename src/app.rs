use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::health;
use crate::webhook::{
    self, EventHandler, HmacSha512Verifier, LoggingEventHandler, MemoryIdempotencyStore,
    WebhookState,
};

/// Request-id source for the tracing middleware
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// Main application structure for hookgate
///
/// Assembles the webhook route, health endpoint, and middleware stack from a
/// validated [`Config`], and serves them with graceful shutdown.
pub struct App {
    config: Config,
    handler: Arc<dyn EventHandler>,
}

impl App {
    /// Creates a new App from the provided configuration
    ///
    /// Events are handed to [`LoggingEventHandler`] unless a real handler is
    /// plugged in via [`App::with_handler`].
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            handler: Arc::new(LoggingEventHandler),
        }
    }

    /// Set the downstream handler for admitted events
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    fn build_router(&self) -> Router {
        let state = match self.config.webhook.secret {
            Some(ref secret) => WebhookState::new(
                Arc::new(HmacSha512Verifier::new(secret.clone())),
                self.handler.clone(),
            ),
            // Reachable only when Config validation was bypassed; the route
            // answers 500 to everything
            None => WebhookState::unconfigured(self.handler.clone()),
        };

        let state = if self.config.webhook.replay_guard {
            state.with_replay_guard(Arc::new(MemoryIdempotencyStore::new(
                self.config.webhook.replay_capacity,
            )))
        } else {
            state
        };

        let router = webhook::routes(&self.config.webhook.path, state)
            .merge(health::health_routes(self.config.webhook.secret.is_some()));

        // Middleware order (from outer to inner):
        // 1. Body size limit - reject oversized bodies before buffering them
        // 2. Request ID - set/propagate ids for tracing
        // 3. Trace layer - HTTP tracing
        router
            .layer(DefaultBodyLimit::max(self.config.server.max_body_size))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
    }

    /// Get the router for testing purposes
    ///
    /// The returned router can be driven with the helpers in
    /// [`crate::testing`] without binding a socket.
    pub fn into_test_router(self) -> Router {
        self.build_router()
    }

    /// Start the application server
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .server
            .addr()
            .expect("Invalid server address in config");

        let router = self.build_router();
        let path = self.config.webhook.path.clone();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Webhook listener starting on http://{}{}", addr, path);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give in-flight requests a grace period to finish
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
