//! Archive endpoints: async zip creation with poll-based status, and
//! synchronous extraction.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use reformer_core::archive::ZipCompressionLevel;
use reformer_core::service::ExtractedFile;
use reformer_core::{FileCategory, IncomingItem, JobStatus, WorkspaceId};

use crate::state::AppState;

use super::error::{bad_request, internal_error, request_error, ApiError};
use super::upload::receive_uploads;

#[derive(Serialize)]
pub struct ArchiveAcceptedResponse {
    pub workspace_id: String,
}

/// POST /api/v1/archive/compress
///
/// Responds 202 with the workspace id immediately and builds the zip on
/// a detached task; callers poll the status endpoint for the terminal
/// state.
pub async fn compress(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ArchiveAcceptedResponse>), ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Any,
    )
    .await?;

    // Unknown levels fall back to plain deflate.
    let level = form
        .field("level")
        .and_then(|l| l.parse::<ZipCompressionLevel>().ok())
        .unwrap_or_default();

    let items: Vec<_> = form
        .items
        .into_iter()
        .filter_map(|item| match item {
            IncomingItem::Accepted(item) => Some(item),
            IncomingItem::Rejected { .. } => None,
        })
        .collect();
    if items.is_empty() {
        return Err(bad_request("no files were uploaded"));
    }

    let workspace_id = workspace.id().to_string();
    state.service().spawn_compress_job(workspace, items, level);

    Ok((
        StatusCode::ACCEPTED,
        Json(ArchiveAcceptedResponse { workspace_id }),
    ))
}

/// GET /api/v1/archive/status/{id}
///
/// Poll surface for async jobs: a terminal record is returned verbatim,
/// a live workspace without one reads as processing, anything else is a
/// 404. Reaped and never-started jobs are indistinguishable.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<WorkspaceId>() else {
        return job_not_found();
    };

    match state.registry().status(id).await {
        JobStatus::Finished(record) => Json(record).into_response(),
        JobStatus::Processing => Json(json!({ "status": "processing" })).into_response(),
        JobStatus::NotFound => job_not_found(),
    }
}

fn job_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "not_found", "message": "job not found" })),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub workspace_id: String,
    pub files: Vec<ExtractedFile>,
    pub count: usize,
}

/// POST /api/v1/archive/extract
///
/// Extracts one uploaded archive; entries are flattened to sanitized
/// basenames.
pub async fn extract(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let mut form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Archive,
    )
    .await?;

    if form.items.is_empty() {
        return Err(bad_request("no archive was uploaded"));
    }
    let item = form.items.remove(0);

    let files = state
        .service()
        .extract_archive_upload(&workspace, item)
        .await
        .map_err(request_error)?;

    Ok(Json(ExtractResponse {
        workspace_id: workspace.id().to_string(),
        count: files.len(),
        files,
    }))
}
