use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// A parsed webhook event
///
/// Only materialized after signature verification succeeds. Paystack
/// deliveries carry an event-type discriminator and an opaque payload:
/// `{"event":"charge.success","data":{...}}`. What the payload means is the
/// downstream handler's business, not the gateway's.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type discriminator (e.g. "charge.success")
    pub event: String,
    /// Event payload, passed through untouched
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEvent {
    pub fn event_type(&self) -> &str {
        &self.event
    }
}

/// Trait for handling admitted webhook events
///
/// The gateway invokes this exactly once per admitted request, after the
/// acknowledgement has been dispatched. Handlers should return quickly and
/// push long-running work elsewhere; the sender has already been told the
/// delivery succeeded.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle the webhook event
    async fn handle(&self, event: &WebhookEvent) -> Result<()>;

    /// Optional: called when `handle` fails
    async fn on_error(&self, event: &WebhookEvent, error: &crate::error::HookgateError) {
        tracing::error!(
            event_type = event.event_type(),
            error = %error,
            "Webhook processing failed"
        );
    }
}

/// Default handler that logs the event type and nothing else
///
/// Matches what a fresh deployment wants before real business logic exists:
/// visibility into what the sender is delivering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &WebhookEvent) -> Result<()> {
        tracing::info!(event_type = event.event_type(), "Webhook event received");
        Ok(())
    }
}
