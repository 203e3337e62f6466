//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadre::TemplateError;
use serde::Serialize;
use tracing::warn;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unprocessable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::UnknownTemplate(_) => AppError::NotFound(err.to_string()),
            TemplateError::MissingPlaceholder { .. } => AppError::Unprocessable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        warn!(status = %status.as_u16(), "{}", message);
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
