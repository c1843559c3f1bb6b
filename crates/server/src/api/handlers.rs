use axum::{extract::State, Json};
use logfetch_core::SanitizedConfig;
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::{collect_job_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus metrics in text exposition format.
///
/// Per-status job gauges are refreshed from the registry on every scrape.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_job_metrics(&state);
    encode_metrics()
}
