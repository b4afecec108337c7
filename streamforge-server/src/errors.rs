//! HTTP-facing error type. Maps the domain [`StreamForgeError`] taxonomy
//! onto status codes (spec.md §7), grounded on the teacher's `AppError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use streamforge_core::StreamForgeError;

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<StreamForgeError> for AppError {
    fn from(err: StreamForgeError) -> Self {
        let status = match &err {
            StreamForgeError::Validation(_) => StatusCode::BAD_REQUEST,
            StreamForgeError::NotFound(_) => StatusCode::NOT_FOUND,
            StreamForgeError::Forbidden(_) => StatusCode::FORBIDDEN,
            StreamForgeError::Conflict(_) => StatusCode::CONFLICT,
            StreamForgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "internal error");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        });
        (self.status, axum::Json(body)).into_response()
    }
}
