//! Shared helpers for the handlers.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::WithRejection;

use crate::journal::JournalError;
use crate::photo::{ImageError, MAX_IMAGE_SIZE};
use crate::storage::StorageError;

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

pub fn journal_error(e: &JournalError) -> Response {
    let status = match e {
        JournalError::Validation(_) => StatusCode::BAD_REQUEST,
        JournalError::Degraded(_) => StatusCode::CONFLICT,
        JournalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

pub fn storage_error(e: &StorageError) -> Response {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub fn image_error(e: &ImageError) -> Response {
    let status = match e {
        ImageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ImageError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    api_error(status, e.to_string())
}

/// Multipart failures keep their own status; a body over the route limit
/// is a 413 like any other oversized image.
pub fn multipart_error(e: &MultipartError) -> Response {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return api_error(
            status,
            format!("image exceeds maximum size of {MAX_IMAGE_SIZE} bytes"),
        );
    }
    api_error(status, format!("failed to read upload: {}", e.body_text()))
}

/// Rejection for JSON bodies that do not match the request type, answered
/// with the usual `{ "error": ... }` body.
pub struct JsonBodyError(Response);

impl From<JsonRejection> for JsonBodyError {
    fn from(rejection: JsonRejection) -> Self {
        JsonBodyError(api_error(rejection.status(), rejection.body_text()))
    }
}

/// JSON body extractor whose rejections use the `{ "error": ... }` shape.
pub type ApiJson<T> = WithRejection<axum::Json<T>, JsonBodyError>;

impl IntoResponse for JsonBodyError {
    fn into_response(self) -> Response {
        self.0
    }
}
