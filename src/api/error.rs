//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::pipeline::DetectionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Upload too large")]
    PayloadTooLarge { limit_mb: usize },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidImage(detail) => {
                (StatusCode::BAD_REQUEST, "INVALID_IMAGE", detail.clone())
            }
            ApiError::PayloadTooLarge { limit_mb } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Image too large. Maximum size: {limit_mb}MB"),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Error processing image".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        match err {
            // The client sent bytes we cannot decode
            DetectionError::ImageDecode(detail) => ApiError::InvalidImage(detail),
            // Model problems are ours, not the client's
            DetectionError::ModelLoad(detail) | DetectionError::Inference(detail) => {
                ApiError::Internal(detail)
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed multipart body: {err}"))
    }
}
