use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for hookgate
///
/// Every rejection path in the gateway maps onto one of these variants, and
/// each variant maps onto exactly one HTTP status code. No error escapes to
/// the transport layer uncaught.
#[derive(Debug, thiserror::Error)]
pub enum HookgateError {
    /// The webhook secret is not configured. The service fails closed:
    /// nothing is verified, nothing is admitted.
    #[error("Server misconfigured")]
    NotConfigured,

    /// The signature header was absent from the request.
    #[error("Missing signature")]
    MissingSignature,

    /// The claimed signature did not match the one computed over the raw
    /// body. Either the payload was tampered with or the secrets disagree.
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Standard error response format for rejected requests.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    error_id: String,
}

impl HookgateError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingSignature => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a message safe to send to the client.
    ///
    /// Client errors (4xx) expose their message; the sender needs to know
    /// what to fix. Server errors (5xx) get a generic message to prevent
    /// information disclosure - the details only go to the server log.
    fn safe_message(&self) -> String {
        match self {
            Self::MissingSignature => "Missing signature".to_string(),
            Self::InvalidSignature => "Invalid signature".to_string(),
            Self::BadRequest(msg) => format!("Bad request: {}", msg),

            Self::NotConfigured => "Server misconfigured".to_string(),
            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for HookgateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        // Full error details stay server-side
        tracing::warn!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request rejected"
        );

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for hookgate
pub type Result<T> = std::result::Result<T, HookgateError>;

impl From<serde_json::Error> for HookgateError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            HookgateError::BadRequest(format!("JSON error: {}", err))
        } else {
            HookgateError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}
