//! API error type and JSON error response formatting.
//!
//! Every failing endpoint answers with the same `{success: false, error}`
//! body so clients can branch on `success` alone.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frontdesk_core::RegistryError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request, a required request field was missing or empty.
    MissingField(&'static str),
    /// 404 Not Found, the session id is not registered.
    SessionNotFound,
    /// 500 Internal Server Error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::MissingField(field) => {
                (StatusCode::BAD_REQUEST, format!("{field} is required"))
            }
            ApiError::SessionNotFound => {
                (StatusCode::NOT_FOUND, "Session not found".to_string())
            }
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        let body = ErrorBody {
            success: false,
            error,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSession(_) => ApiError::SessionNotFound,
        }
    }
}
