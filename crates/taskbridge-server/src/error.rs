//! HTTP status mapping for bridge errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskbridge_common::{BridgeError, ErrorDescriptor};

/// Failures that happen before a task runs, or outside any task
pub enum ApiError {
    Bridge(BridgeError),
    BadRequest(String),
}

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        ApiError::Bridge(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Bridge(e) => match e {
                BridgeError::UnknownTask(_) => (StatusCode::NOT_FOUND, e.to_string()),
                BridgeError::Connection(_) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
                BridgeError::InvalidRequest(_) | BridgeError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
        };

        (status, Json(ErrorDescriptor::new(message))).into_response()
    }
}
