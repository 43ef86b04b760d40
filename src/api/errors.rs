use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

const GENERIC_FAILURE: &str = "Internal server error";

/// Converts `AppError` into an HTTP response with a `{ "error": ... }` body.
///
/// Internal failures are logged with full detail and answered with a generic
/// message so database or storage error text never reaches the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Auth(msg)
            | AppError::Conflict(msg) => msg.clone(),
            internal => {
                tracing::error!(error = %internal, "request failed");
                GENERIC_FAILURE.to_string()
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}
