//! HTTP error responses.
//!
//! Every failure is rendered as `{ "error": "<message>" }`. Server-side
//! failures get a generic message; the detail only goes to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hms_core::error::HmsError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<HmsError> for ApiError {
    fn from(err: HmsError) -> Self {
        match err {
            HmsError::NotFound { entity, .. } => Self::not_found(format!(
                "{} not found",
                capitalize(&entity)
            )),
            // Duplicate emails surface as a plain 400.
            HmsError::AlreadyExists { .. } => Self::bad_request(err.to_string()),
            HmsError::Validation { message } => Self::bad_request(message),
            HmsError::AuthenticationFailed { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            HmsError::AuthorizationDenied { .. } => Self::forbidden(),
            HmsError::Database(_) | HmsError::Crypto(_) | HmsError::Internal(_) => {
                Self::internal(err)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
