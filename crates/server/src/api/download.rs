//! Artifact download endpoint.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use reformer_core::workspace::OUTPUT_DIR;
use reformer_core::{sanitize_filename, WorkspaceId};

use crate::state::AppState;

use super::error::{internal_error, not_found, ApiError};

const GONE_MESSAGE: &str = "file not found or expired";

/// GET /api/v1/download/{id}/{filename}
///
/// Streams an artifact out of a workspace's output directory. A reaped
/// workspace or unknown name is a 404, never a server error.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id: WorkspaceId = id.parse().map_err(|_| not_found(GONE_MESSAGE))?;
    let workspace = state
        .workspaces()
        .open(id)
        .await
        .map_err(|_| not_found(GONE_MESSAGE))?;

    // Sanitization keeps the lookup inside the output directory.
    let file_name = sanitize_filename(&filename);
    let path = workspace.path().join(OUTPUT_DIR).join(&file_name);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| not_found(GONE_MESSAGE))?;
    let metadata = file.metadata().await.map_err(|_| not_found(GONE_MESSAGE))?;

    let content_type = mime_guess::from_path(&file_name).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(body)
        .map_err(internal_error)
}
