//! Webhook gatekeeping.
//!
//! Signature verification over the raw request body, event parsing and
//! handoff, and an optional replay guard for incoming payment webhooks.

pub mod event;
pub mod idempotency;
pub mod routes;
pub mod verification;

pub use event::{EventHandler, LoggingEventHandler, WebhookEvent};
pub use idempotency::{IdempotencyStore, MemoryIdempotencyStore, body_fingerprint};
pub use routes::{SIGNATURE_HEADER, WebhookState, routes};
pub use verification::{HmacSha512Verifier, SignatureVerifier};
