//! Health check endpoint.

use axum::extract::State;
use serde::Serialize;

use pondbridge_types::agent::AgentStatus;

use crate::http::response::{ApiResponse, request_id};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub version: &'static str,
    pub agent: AgentStatus,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let agent = state.agent.read().await.status();
    ApiResponse::success(
        HealthData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            agent,
        },
        request_id(),
        0,
    )
}
