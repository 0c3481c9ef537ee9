//! Audio and video transcode endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;

use reformer_core::pipeline::{AudioOutputFormat, VideoOutputFormat};
use reformer_core::service::effective_bitrate;
use reformer_core::FileCategory;

use crate::state::AppState;

use super::convert::BatchResponse;
use super::error::{bad_request, internal_error, request_error, ApiError};
use super::upload::receive_uploads;

/// POST /api/v1/audio/transcode
///
/// Transcodes audio files; `format` defaults to mp3, `bitrate` to 128.
pub async fn transcode_audio(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Audio,
    )
    .await?;

    let format: AudioOutputFormat = form
        .field("format")
        .unwrap_or("mp3")
        .parse()
        .map_err(|e: reformer_core::pipeline::UnknownFormat| bad_request(e.to_string()))?;
    let bitrate = effective_bitrate(form.field("bitrate").and_then(|b| b.parse::<u32>().ok()));

    let items = state
        .service()
        .transcode_audio_batch(&workspace, form.items, format, bitrate)
        .await
        .map_err(request_error)?;

    Ok(Json(BatchResponse {
        items,
        workspace_id: workspace.id().to_string(),
    }))
}

/// POST /api/v1/video/transcode
///
/// Transcodes video files through the remux-then-reencode pipeline;
/// `format` defaults to mp4.
pub async fn transcode_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let workspace = state.workspaces().create().await.map_err(internal_error)?;
    let form = receive_uploads(
        &mut multipart,
        &workspace,
        state.filter(),
        FileCategory::Video,
    )
    .await?;

    let format: VideoOutputFormat = form
        .field("format")
        .unwrap_or("mp4")
        .parse()
        .map_err(|e: reformer_core::pipeline::UnknownFormat| bad_request(e.to_string()))?;

    let items = state
        .service()
        .transcode_video_batch(&workspace, form.items, format)
        .await
        .map_err(request_error)?;

    Ok(Json(BatchResponse {
        items,
        workspace_id: workspace.id().to_string(),
    }))
}
