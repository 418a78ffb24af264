use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{HookgateError, Result};

/// Main configuration for a hookgate deployment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Configuration for the webhook endpoint itself
///
/// The shared secret is held as a [`SecretString`]: it is loaded once at
/// startup, redacted from debug output, and never serialized or logged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    #[serde(skip)]
    pub secret: Option<SecretString>,
    /// Route the sender POSTs events to
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Track digests of admitted bodies and skip re-dispatching replays
    #[serde(default)]
    pub replay_guard: bool,
    /// Retention bound for the replay guard (digest count)
    #[serde(default = "default_replay_capacity")]
    pub replay_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            path: default_webhook_path(),
            replay_guard: false,
            replay_capacity: default_replay_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_max_body_size() -> usize {
    1024 * 1024 // webhook payloads are small; 1MB is generous
}

fn default_webhook_path() -> String {
    "/paystack/webhook".to_string()
}

fn default_replay_capacity() -> usize {
    10_000
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Read `HOOKGATE_<name>` from the environment
fn get_env_with_prefix(name: &str) -> Option<String> {
    std::env::var(format!("HOOKGATE_{}", name)).ok()
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.webhook.secret = Some(SecretString::new(secret.into()));
        self
    }

    pub fn with_webhook_path(mut self, path: impl Into<String>) -> Self {
        self.config.webhook.path = path.into();
        self
    }

    pub fn with_replay_guard(mut self, enabled: bool) -> Self {
        self.config.webhook.replay_guard = enabled;
        self
    }

    pub fn with_replay_capacity(mut self, capacity: usize) -> Self {
        self.config.webhook.replay_capacity = capacity;
        self
    }

    /// Load configuration from environment variables with HOOKGATE_ prefix
    ///
    /// A few unprefixed fallbacks are honored for drop-in compatibility with
    /// existing Paystack deployments: `PAYSTACK_SECRET`, `PAYSTACK_SECRET_KEY`,
    /// and `PORT` (Railway/Heroku style).
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        let port = get_env_with_prefix("PORT").or_else(|| std::env::var("PORT").ok());
        if let Some(port) = port {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(max_body_size) = get_env_with_prefix("MAX_BODY_SIZE") {
            if let Ok(size) = max_body_size.parse() {
                self.config.server.max_body_size = size;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        let secret = get_env_with_prefix("SECRET")
            .or_else(|| std::env::var("PAYSTACK_SECRET").ok())
            .or_else(|| std::env::var("PAYSTACK_SECRET_KEY").ok());
        if let Some(secret) = secret {
            self.config.webhook.secret = Some(SecretString::new(secret));
        }

        if let Some(path) = get_env_with_prefix("WEBHOOK_PATH") {
            self.config.webhook.path = path;
        }
        if let Some(guard) = get_env_with_prefix("REPLAY_GUARD") {
            self.config.webhook.replay_guard = guard.parse().unwrap_or(false);
        }
        if let Some(capacity) = get_env_with_prefix("REPLAY_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                self.config.webhook.replay_capacity = c;
            }
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid. In particular, a
    /// missing or empty webhook secret is a fatal configuration error: the
    /// service refuses to start rather than serve unverifiable traffic.
    pub fn build(self) -> Result<Config> {
        self.config.server.addr().map_err(|e| {
            HookgateError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(HookgateError::bad_request(
                "Server port must be greater than 0",
            ));
        }

        if self.config.server.max_body_size == 0 {
            return Err(HookgateError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(HookgateError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        // Fail closed: without a secret, nothing can be verified
        match self.config.webhook.secret {
            None => return Err(HookgateError::NotConfigured),
            Some(ref secret) if secret.expose_secret().is_empty() => {
                return Err(HookgateError::NotConfigured);
            }
            Some(_) => {}
        }

        if !self.config.webhook.path.starts_with('/') {
            return Err(HookgateError::bad_request(format!(
                "Webhook path must start with '/': {}",
                self.config.webhook.path
            )));
        }

        if self.config.webhook.replay_guard && self.config.webhook.replay_capacity == 0 {
            return Err(HookgateError::bad_request(
                "Replay guard capacity must be greater than 0 when enabled",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
