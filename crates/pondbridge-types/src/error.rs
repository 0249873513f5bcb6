use thiserror::Error;

use crate::agent::AgentStatus;

/// Errors related to transport operations (P2P gateway connection).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to gateway: {0}")]
    Connect(String),

    #[error("failed to send message to '{to}': {message}")]
    Send { to: String, message: String },

    #[error("transport connection closed")]
    Closed,
}

/// Errors related to agent lifecycle operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("agent is {0}, expected running")]
    NotRunning(AgentStatus),

    #[error("agent is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from outbound telephony delivery (WhatsApp messages).
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telephony provider rejected the message: {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("telephony request failed: {0}")]
    Request(String),

    #[error("telephony credentials are not configured")]
    NotConfigured,
}
