//! Error payloads and status mapping.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use reformer_core::service::RequestError;
use reformer_core::WorkspaceError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::NOT_FOUND, message)
}

pub fn internal_error(message: impl std::fmt::Display) -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

/// Maps a request-wide service error onto a status code: caller mistakes
/// are 400s, a reaped workspace is a 404, and everything else (including
/// a missing engine) is a 500 with the diagnostic.
pub fn request_error(err: RequestError) -> ApiError {
    let status = match &err {
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        RequestError::Workspace(WorkspaceError::NotFound { .. })
        | RequestError::Workspace(WorkspaceError::InvalidId { .. }) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}
