//! Hookgate - an HMAC-verifying gateway for payment webhooks
//!
//! Hookgate sits in front of your payment-event handling logic and admits
//! only webhook deliveries that carry a valid HMAC-SHA512 signature over the
//! raw request body. Everything else is rejected with a deterministic status
//! code before any business logic runs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hookgate::{App, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     hookgate::init_tracing();
//!
//!     let config = ConfigBuilder::new()
//!         .from_env()
//!         .build()
//!         .expect("invalid configuration");
//!
//!     App::with_config(config).serve().await.unwrap();
//! }
//! ```

mod app;
mod config;
mod error;
pub mod health;
pub mod testing;
pub mod webhook;

// Re-exports for public API
pub use app::App;
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig, WebhookConfig};
pub use error::{HookgateError, Result};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use webhook::{
    EventHandler, HmacSha512Verifier, IdempotencyStore, LoggingEventHandler,
    MemoryIdempotencyStore, SignatureVerifier, WebhookEvent,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// Call this early in main(), before building the App.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "hookgate=debug")
/// - `HOOKGATE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("HOOKGATE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from an already-built configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
