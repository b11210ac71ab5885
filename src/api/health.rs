//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::ForwarderStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance_id: String,
    pub uptime_seconds: u64,
    pub trigger: TriggerHealthResponse,
    pub provider: ProviderHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct TriggerHealthResponse {
    pub document_pattern: String,
    pub click_action: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderHealthResponse {
    pub project_id: String,
    pub token_source: String,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub uptime_seconds: u64,
    pub notifications: ForwarderStatsSnapshot,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        trigger: TriggerHealthResponse {
            document_pattern: state.pattern.to_string(),
            click_action: state.forwarder.click_action().to_string(),
        },
        provider: ProviderHealthResponse {
            project_id: state.provider.project_id.clone(),
            token_source: state.provider.token_source.clone(),
            dry_run: state.provider.dry_run,
        },
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        uptime_seconds: state.start_time.elapsed().as_secs(),
        notifications: state.forwarder.stats(),
    })
}
