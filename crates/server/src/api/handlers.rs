use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use reformer_core::{AudioSupport, Config, EngineSummary};

use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub engines: EngineSummary,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        engines: state.service().engines().summary(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

#[derive(Serialize)]
pub struct CapabilitiesResponse {
    pub support: AudioSupport,
}

pub async fn audio_capabilities(State(state): State<Arc<AppState>>) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        support: state.service().capabilities(),
    })
}

pub async fn prometheus_metrics() -> String {
    metrics::render()
}
