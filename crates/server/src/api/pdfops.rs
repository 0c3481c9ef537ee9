//! PDF merge and compression endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use reformer_core::service::{PdfCompressResult, PdfMergeResult};
use reformer_core::{FileCategory, PdfCompressionPreset};

use crate::state::AppState;

use super::error::{bad_request, internal_error, request_error, ApiError};
use super::upload::receive_uploads;

#[derive(Serialize)]
pub struct MergeResponse {
    pub status: &'static str,
    pub workspace_id: String,
    #[serde(flatten)]
    pub result: PdfMergeResult,
}

/// POST /api/v1/pdf/merge
///
/// Merges at least two PDFs in upload order.
pub async fn merge_pdfs(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MergeResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Pdf,
    )
    .await?;

    let result = state
        .service()
        .merge_pdfs(&workspace, form.items)
        .await
        .map_err(request_error)?;

    Ok(Json(MergeResponse {
        status: "success",
        workspace_id: workspace.id().to_string(),
        result,
    }))
}

#[derive(Serialize)]
pub struct CompressResponse {
    pub status: &'static str,
    pub workspace_id: String,
    #[serde(flatten)]
    pub result: PdfCompressResult,
}

/// POST /api/v1/pdf/compress
///
/// Optimizes one PDF with a named quality preset.
pub async fn compress_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<CompressResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let mut form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Pdf,
    )
    .await?;

    if form.items.is_empty() {
        return Err(bad_request("no PDF file was uploaded"));
    }
    let item = form.items.remove(0);

    // Unknown presets fall back to the balanced default.
    let preset = form
        .field("preset")
        .and_then(|p| p.parse::<PdfCompressionPreset>().ok())
        .unwrap_or_default();

    let result = state
        .service()
        .compress_pdf(&workspace, item, preset)
        .await
        .map_err(request_error)?;

    Ok(Json(CompressResponse {
        status: "success",
        workspace_id: workspace.id().to_string(),
        result,
    }))
}
