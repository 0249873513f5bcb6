//! Agent lifecycle handlers: `/initialize` and `/stop`.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::info;

use pondbridge_types::agent::{AgentCredentials, AgentStatus};
use pondbridge_types::error::AgentError;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, request_id};
use crate::state::{AgentSlot, AppState};

#[derive(Debug, Serialize)]
pub struct LifecycleData {
    pub status: AgentStatus,
    pub agent_name: String,
}

/// POST /initialize
///
/// Validates the supplied credentials, assembles a fresh agent, connects
/// it to the gateway, and moves the slot to `Running`. The slot is held
/// under a write lock for the whole sequence, so two concurrent
/// initializations cannot both succeed.
pub async fn initialize(
    State(state): State<AppState>,
    Json(credentials): Json<AgentCredentials>,
) -> Result<ApiResponse<LifecycleData>, AppError> {
    let started = Instant::now();
    credentials.validate()?;

    let mut slot = state.agent.write().await;
    if matches!(*slot, AgentSlot::Running(_)) {
        return Err(AgentError::AlreadyRunning.into());
    }

    let agent = state.build_agent(&credentials);
    agent.start().await?;
    *slot = AgentSlot::Running(Arc::new(agent));

    info!(agent_name = %state.config.gateway.agent_name, "agent initialized");
    Ok(ApiResponse::success(
        LifecycleData {
            status: AgentStatus::Running,
            agent_name: state.config.gateway.agent_name.clone(),
        },
        request_id(),
        started.elapsed().as_millis() as u64,
    ))
}

/// POST /stop
///
/// Stops a running agent and moves the slot to `Stopped`. Stopping an
/// already-stopped agent succeeds (idempotent); stopping before any
/// initialization is an error.
pub async fn stop(
    State(state): State<AppState>,
) -> Result<ApiResponse<LifecycleData>, AppError> {
    let started = Instant::now();

    let mut slot = state.agent.write().await;
    match &*slot {
        AgentSlot::Running(agent) => {
            agent.stop().await;
            *slot = AgentSlot::Stopped;
            info!("agent stopped");
        }
        AgentSlot::Stopped => {}
        AgentSlot::Uninitialized => {
            return Err(AgentError::NotRunning(AgentStatus::Uninitialized).into());
        }
    }

    Ok(ApiResponse::success(
        LifecycleData {
            status: AgentStatus::Stopped,
            agent_name: state.config.gateway.agent_name.clone(),
        },
        request_id(),
        started.elapsed().as_millis() as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::Value;
    use tokio::sync::RwLock;

    use pondbridge_types::config::ServiceConfig;

    fn state_with(slot: AgentSlot) -> AppState {
        AppState {
            config: Arc::new(ServiceConfig::default()),
            twilio: None,
            agent: Arc::new(RwLock::new(slot)),
        }
    }

    fn credentials() -> AgentCredentials {
        AgentCredentials {
            private_key: "0xabc".into(),
            provider_api_key: "sk-test".into(),
            gateway_url: None,
        }
    }

    async fn envelope(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_initialize_while_running_returns_conflict_envelope() {
        let state = state_with(AgentSlot::Uninitialized);
        let agent = Arc::new(state.build_agent(&credentials()));
        *state.agent.write().await = AgentSlot::Running(agent);

        let err = initialize(State(state), Json(credentials()))
            .await
            .unwrap_err();
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "AGENT_ALREADY_RUNNING");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_initialize_with_blank_credentials_returns_validation_envelope() {
        let state = state_with(AgentSlot::Uninitialized);
        let mut credentials = credentials();
        credentials.private_key = "   ".into();

        let err = initialize(State(state), Json(credentials))
            .await
            .unwrap_err();
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_stop_before_initialize_returns_envelope_error() {
        let state = state_with(AgentSlot::Uninitialized);

        let err = stop(State(state)).await.unwrap_err();
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "AGENT_NOT_RUNNING");
        assert!(
            body["errors"][0]["message"]
                .as_str()
                .unwrap()
                .contains("uninitialized")
        );
    }

    #[tokio::test]
    async fn test_stop_when_already_stopped_succeeds() {
        let state = state_with(AgentSlot::Stopped);

        let response = stop(State(state)).await.unwrap();
        assert!(response.errors.is_empty());
        assert_eq!(response.data.unwrap().status, AgentStatus::Stopped);
    }
}
