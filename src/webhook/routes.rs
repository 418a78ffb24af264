//! Transport adapter for the webhook endpoint.
//!
//! The one hard requirement on this layer: the request body reaches the
//! verifier as the exact bytes received on the wire. Extracting
//! [`Bytes`] gives us the unparsed body; JSON decoding happens only after
//! the signature checks out.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use std::sync::Arc;

use crate::error::{HookgateError, Result};

use super::event::{EventHandler, WebhookEvent};
use super::idempotency::{IdempotencyStore, body_fingerprint};
use super::verification::SignatureVerifier;

/// Header carrying the claimed signature
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Shared state for the webhook route
#[derive(Clone)]
pub struct WebhookState {
    verifier: Option<Arc<dyn SignatureVerifier>>,
    handler: Arc<dyn EventHandler>,
    replay_guard: Option<Arc<dyn IdempotencyStore>>,
}

impl WebhookState {
    pub fn new(verifier: Arc<dyn SignatureVerifier>, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            verifier: Some(verifier),
            handler,
            replay_guard: None,
        }
    }

    /// State with no verifier configured. Every request gets a 500; nothing
    /// is ever admitted. Startup validation makes this unreachable through
    /// the normal path, but hand-assembled routers keep the fail-closed
    /// contract through this guard.
    pub fn unconfigured(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            verifier: None,
            handler,
            replay_guard: None,
        }
    }

    pub fn with_replay_guard(mut self, store: Arc<dyn IdempotencyStore>) -> Self {
        self.replay_guard = Some(store);
        self
    }
}

/// Handler for inbound webhook deliveries
///
/// Admission order: configured secret, signature header present, signature
/// valid over the raw bytes, body parses as an event. Each rejection
/// produces its status code from the error type and never reaches the
/// downstream handler. Admitted events are acknowledged first and processed
/// on a spawned task, so the sender's delivery timeout never depends on
/// business logic.
pub async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str> {
    let verifier = state.verifier.as_ref().ok_or(HookgateError::NotConfigured)?;

    // A header that is present but not decodable can never match a hex MAC
    let signature = match headers.get(SIGNATURE_HEADER) {
        None => return Err(HookgateError::MissingSignature),
        Some(value) => value.to_str().map_err(|_| HookgateError::InvalidSignature)?,
    };

    if !verifier.verify_signature(&body, signature).await? {
        return Err(HookgateError::InvalidSignature);
    }

    let fingerprint = match state.replay_guard {
        Some(ref guard) => {
            let fingerprint = body_fingerprint(&body);
            if guard.is_processed(&fingerprint).await? {
                // Replayed delivery: acknowledge so the sender stops
                // retrying, but do not hand it to the handler again
                tracing::info!("Skipping already processed webhook delivery");
                return Ok("OK");
            }
            Some(fingerprint)
        }
        None => None,
    };

    // Verification proves origin, not well-formedness
    let event: WebhookEvent = serde_json::from_slice(&body)
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to parse verified webhook payload"))?;

    // Only a parsed, dispatched delivery counts as processed. A 400 tells
    // the sender to retry, so the retry path must stay open.
    if let (Some(guard), Some(fingerprint)) = (state.replay_guard.as_ref(), fingerprint) {
        guard.mark_processed(fingerprint).await?;
    }

    tracing::info!(event_type = event.event_type(), "Webhook admitted");

    // Acknowledge-then-process: exactly one handoff per admitted request
    let handler = state.handler.clone();
    tokio::spawn(async move {
        if let Err(e) = handler.handle(&event).await {
            handler.on_error(&event, &e).await;
        }
    });

    Ok("OK")
}

/// Build the webhook router at the given path
pub fn routes(path: &str, state: WebhookState) -> Router {
    Router::new().route(path, post(receive)).with_state(state)
}
