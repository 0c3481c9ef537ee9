use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{archive, convert, download, handlers, media, pdfops};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Size ceilings are enforced per file by the upload sink, so the
    // framework-level body cap gets out of the way.
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Document conversion
        .route("/convert/office", post(convert::office_to_pdf))
        .route("/convert/image", post(convert::convert_image))
        .route("/convert/pdf-to-docx", post(convert::pdf_to_docx))
        // PDF tools
        .route("/pdf/merge", post(pdfops::merge_pdfs))
        .route("/pdf/compress", post(pdfops::compress_pdf))
        // Audio / video
        .route("/audio/transcode", post(media::transcode_audio))
        .route("/audio/capabilities", get(handlers::audio_capabilities))
        .route("/video/transcode", post(media::transcode_video))
        // Archives (async job + poll)
        .route("/archive/compress", post(archive::compress))
        .route("/archive/status/{id}", get(archive::status))
        .route("/archive/extract", post(archive::extract))
        // Artifact retrieval
        .route("/download/{id}/{filename}", get(download::download))
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
