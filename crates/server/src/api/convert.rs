//! Document conversion endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use reformer_core::images::ImageOutputFormat;
use reformer_core::{FileCategory, ItemOutcome};

use crate::state::AppState;

use super::error::{bad_request, internal_error, request_error, ApiError};
use super::upload::receive_uploads;

/// Batch response, index-aligned with the uploaded files.
#[derive(Serialize)]
pub struct BatchResponse {
    pub items: Vec<ItemOutcome>,
    pub workspace_id: String,
}

/// POST /api/v1/convert/office
///
/// Converts office documents to PDF.
pub async fn office_to_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::OfficeDocument,
    )
    .await?;

    let items = state
        .service()
        .convert_office_batch(&workspace, form.items)
        .await
        .map_err(request_error)?;

    Ok(Json(BatchResponse {
        items,
        workspace_id: workspace.id().to_string(),
    }))
}

/// POST /api/v1/convert/image
///
/// Converts images to the requested format, with an optional quality
/// setting for the codecs that have one.
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Image,
    )
    .await?;

    let format: ImageOutputFormat = form
        .field("format")
        .ok_or_else(|| bad_request("no output format specified"))?
        .parse()
        .map_err(|e: reformer_core::pipeline::UnknownFormat| bad_request(e.to_string()))?;
    let quality = form.field("quality").and_then(|q| q.parse::<u8>().ok());

    let items = state
        .service()
        .convert_image_batch(&workspace, form.items, format, quality)
        .await
        .map_err(request_error)?;

    Ok(Json(BatchResponse {
        items,
        workspace_id: workspace.id().to_string(),
    }))
}

/// POST /api/v1/convert/pdf-to-docx
///
/// Converts PDFs to editable documents, stripping blank pages first.
pub async fn pdf_to_docx(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Pdf,
    )
    .await?;

    let items = state
        .service()
        .pdf_to_docx_batch(&workspace, form.items)
        .await
        .map_err(request_error)?;

    Ok(Json(BatchResponse {
        items,
        workspace_id: workspace.id().to_string(),
    }))
}
