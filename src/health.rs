use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

/// Build the health response for this process
///
/// Reports liveness plus whether the webhook secret is configured. A
/// gateway without a secret admits nothing, which operators want surfaced
/// here rather than discovered through a stream of 500s. The secret itself
/// never appears in the response.
fn check_health(secret_configured: bool) -> HealthResponse {
    let mut checks = vec![ComponentHealth {
        name: "application".to_string(),
        status: HealthStatus::Healthy,
        message: Some("Application is running".to_string()),
    }];

    let (status, message) = if secret_configured {
        (HealthStatus::Healthy, "Webhook secret configured")
    } else {
        (HealthStatus::Unhealthy, "Webhook secret not configured")
    };
    checks.push(ComponentHealth {
        name: "webhook_secret".to_string(),
        status: status.clone(),
        message: Some(message.to_string()),
    });

    let overall = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    };

    HealthResponse {
        status: overall,
        checks,
    }
}

/// Creates the health check router
pub fn health_routes(secret_configured: bool) -> Router {
    Router::new().route(
        "/health",
        get(move || async move { check_health(secret_configured) }),
    )
}
