//! End-to-end tests for the webhook gateway, driven through the full app
//! router (middleware included).

use async_trait::async_trait;
use axum::http::StatusCode;
use hookgate::{
    App, ConfigBuilder, EventHandler, HmacSha512Verifier, Result, WebhookEvent, testing,
};
use secrecy::SecretString;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

const SECRET: &str = "whsec_test";
const BODY: &str = r#"{"event":"charge.success","data":{"reference":"abc123"}}"#;
const SIGNATURE_HEADER: &str = "x-paystack-signature";

struct RecordingHandler {
    calls: Arc<AtomicUsize>,
    last_event_type: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &WebhookEvent) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_event_type.lock().await = Some(event.event_type().to_string());
        Ok(())
    }
}

struct TestApp {
    router: axum::Router,
    calls: Arc<AtomicUsize>,
    last_event_type: Arc<Mutex<Option<String>>>,
}

fn test_app() -> TestApp {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_event_type = Arc::new(Mutex::new(None));

    let config = ConfigBuilder::new().with_secret(SECRET).build().unwrap();
    let router = App::with_config(config)
        .with_handler(Arc::new(RecordingHandler {
            calls: calls.clone(),
            last_event_type: last_event_type.clone(),
        }))
        .into_test_router();

    TestApp {
        router,
        calls,
        last_event_type,
    }
}

fn sign(body: &str) -> String {
    HmacSha512Verifier::new(SecretString::new(SECRET.to_string()))
        .expected_signature(body.as_bytes())
        .unwrap()
}

async fn settle() {
    // Give the spawned handler task a chance to run
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}

#[tokio::test]
async fn correctly_signed_request_is_admitted() {
    let app = test_app();

    let body = testing::post(app.router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &sign(BODY))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::OK)
        .assert_has_header("x-request-id")
        .body_string()
        .await;
    assert_eq!(body, "OK");

    settle().await;
    assert_eq!(app.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        app.last_event_type.lock().await.as_deref(),
        Some("charge.success")
    );
}

#[tokio::test]
async fn altered_last_hex_character_is_rejected() {
    let app = test_app();

    let mut signature = sign(BODY);
    let last = signature.pop().unwrap();
    signature.push(if last == '0' { '1' } else { '0' });

    testing::post(app.router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &signature)
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    settle().await;
    assert_eq!(app.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_signature_header_is_400_regardless_of_body() {
    for body in [BODY, "", "not even json", "{}"] {
        let app = test_app();

        testing::post(app.router, "/paystack/webhook")
            .body(body)
            .execute()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        settle().await;
        assert_eq!(app.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn well_formed_but_wrong_signature_is_401() {
    let app = test_app();

    // Syntactically valid hex of the right length, wrong value
    testing::post(app.router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &"ab".repeat(64))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    settle().await;
    assert_eq!(app.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn signature_over_different_body_is_401() {
    let app = test_app();

    let other = r#"{"event":"charge.success","data":{"reference":"zzz999"}}"#;
    testing::post(app.router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &sign(other))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_delivery_is_handed_off_once() {
    let app = test_app();

    // Without the replay guard (the default), identical deliveries each get
    // their own handoff
    for _ in 0..3 {
        testing::post(app.router.clone(), "/paystack/webhook")
            .header(SIGNATURE_HEADER, &sign(BODY))
            .body(BODY)
            .execute()
            .await
            .assert_status(StatusCode::OK);
    }

    settle().await;
    assert_eq!(app.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn replay_guard_suppresses_duplicate_handoff() {
    let calls = Arc::new(AtomicUsize::new(0));

    let config = ConfigBuilder::new()
        .with_secret(SECRET)
        .with_replay_guard(true)
        .build()
        .unwrap();
    let router = App::with_config(config)
        .with_handler(Arc::new(RecordingHandler {
            calls: calls.clone(),
            last_event_type: Arc::new(Mutex::new(None)),
        }))
        .into_test_router();

    for _ in 0..3 {
        testing::post(router.clone(), "/paystack/webhook")
            .header(SIGNATURE_HEADER, &sign(BODY))
            .body(BODY)
            .execute()
            .await
            .assert_status(StatusCode::OK);
    }

    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retried_unparseable_delivery_is_rejected_again() {
    let calls = Arc::new(AtomicUsize::new(0));

    let config = ConfigBuilder::new()
        .with_secret(SECRET)
        .with_replay_guard(true)
        .build()
        .unwrap();
    let router = App::with_config(config)
        .with_handler(Arc::new(RecordingHandler {
            calls: calls.clone(),
            last_event_type: Arc::new(Mutex::new(None)),
        }))
        .into_test_router();

    // Signed correctly but not JSON: the sender gets a 400 and retries the
    // identical bytes. The retry must get the same 400, never a 200 for an
    // event that was never handled.
    let body = "{ not json }";
    let signature = sign(body);

    for _ in 0..2 {
        testing::post(router.clone(), "/paystack/webhook")
            .header(SIGNATURE_HEADER, &signature)
            .body(body)
            .execute()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // The guard still deduplicates well-formed deliveries
    for _ in 0..2 {
        testing::post(router.clone(), "/paystack/webhook")
            .header(SIGNATURE_HEADER, &sign(BODY))
            .body(BODY)
            .execute()
            .await
            .assert_status(StatusCode::OK);
    }

    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn custom_webhook_path_is_honored() {
    let config = ConfigBuilder::new()
        .with_secret(SECRET)
        .with_webhook_path("/hooks/payments")
        .build()
        .unwrap();
    let router = App::with_config(config).into_test_router();

    testing::post(router.clone(), "/hooks/payments")
        .header(SIGNATURE_HEADER, &sign(BODY))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::OK);

    // The default path no longer exists
    testing::post(router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &sign(BODY))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected_before_verification() {
    let config = ConfigBuilder::new()
        .with_secret(SECRET)
        .with_max_body_size(64)
        .build()
        .unwrap();
    let router = App::with_config(config).into_test_router();

    let big_body = format!(r#"{{"event":"charge.success","data":{{"blob":"{}"}}}}"#, "x".repeat(256));
    testing::post(router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &sign(&big_body))
        .body(big_body)
        .execute()
        .await
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = test_app();

    let body: serde_json::Value = testing::get(app.router, "/health")
        .execute()
        .await
        .assert_status(StatusCode::OK)
        .json()
        .await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn rejection_bodies_match_the_contract() {
    let app = test_app();
    let body: serde_json::Value = testing::post(app.router, "/paystack/webhook")
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json()
        .await;
    assert_eq!(body["error"], "Missing signature");

    let app = test_app();
    let body: serde_json::Value = testing::post(app.router, "/paystack/webhook")
        .header(SIGNATURE_HEADER, &"ab".repeat(64))
        .body(BODY)
        .execute()
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .json()
        .await;
    assert_eq!(body["error"], "Invalid signature");
}
