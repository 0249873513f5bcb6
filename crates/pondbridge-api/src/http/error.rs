//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use pondbridge_types::error::{AgentError, DeliveryError, TransportError};

use crate::http::response::{ApiResponse, request_id};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Agent lifecycle errors.
    Agent(AgentError),
    /// Gateway transport errors.
    Transport(TransportError),
    /// Outbound WhatsApp delivery errors.
    Delivery(DeliveryError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e)
    }
}

impl From<DeliveryError> for AppError {
    fn from(e: DeliveryError) -> Self {
        AppError::Delivery(e)
    }
}

impl AppError {
    /// Machine-readable code and human-readable message for the envelope.
    ///
    /// The HTTP status is derived from the code by
    /// [`ApiResponse::into_response`].
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Agent(AgentError::NotRunning(status)) => (
                "AGENT_NOT_RUNNING",
                format!("Agent is not running (status: {status})"),
            ),
            AppError::Agent(AgentError::AlreadyRunning) => {
                ("AGENT_ALREADY_RUNNING", "Agent is already running".to_string())
            }
            AppError::Agent(AgentError::MissingCredential(field)) => {
                ("VALIDATION_ERROR", format!("Missing credential: {field}"))
            }
            AppError::Agent(AgentError::Transport(TransportError::Connect(msg))) => (
                "GATEWAY_UNAVAILABLE",
                format!("Failed to connect to gateway: {msg}"),
            ),
            AppError::Agent(e) => ("AGENT_ERROR", e.to_string()),
            AppError::Transport(TransportError::Connect(msg)) => (
                "GATEWAY_UNAVAILABLE",
                format!("Failed to connect to gateway: {msg}"),
            ),
            AppError::Transport(e) => ("TRANSPORT_ERROR", e.to_string()),
            AppError::Delivery(DeliveryError::NotConfigured) => (
                "TWILIO_NOT_CONFIGURED",
                "Twilio credentials are not configured".to_string(),
            ),
            AppError::Delivery(e) => ("DELIVERY_FAILED", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        ApiResponse::error(code, &message, request_id(), 0).into_response()
    }
}
