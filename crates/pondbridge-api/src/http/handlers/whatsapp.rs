//! Twilio WhatsApp webhook handler.
//!
//! Twilio posts inbound WhatsApp messages as form-encoded bodies with
//! capitalized field names. The sender address (`whatsapp:+1555...`)
//! doubles as the conversation key, so WhatsApp threads share the same
//! bounded history mechanics as P2P counterparties.

use std::time::Instant;

use axum::Form;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use pondbridge_types::error::{AgentError, DeliveryError};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, request_id};
use crate::state::AppState;

/// Inbound webhook payload; Twilio sends more fields, only these matter.
#[derive(Debug, Deserialize)]
pub struct TwilioWebhook {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookData {
    pub delivered: bool,
}

/// POST /api/whatsapp
///
/// Composes a reply through the running agent and delivers it back over
/// Twilio. A delivery failure is reported in the error envelope; the
/// composed reply is not retried.
pub async fn receive(
    State(state): State<AppState>,
    Form(webhook): Form<TwilioWebhook>,
) -> Result<ApiResponse<WebhookData>, AppError> {
    let started = Instant::now();

    if webhook.from.trim().is_empty() || webhook.body.trim().is_empty() {
        return Err(AppError::Validation(
            "webhook requires non-empty From and Body".to_string(),
        ));
    }

    // Clone the agent handle out so the composition does not hold the
    // slot lock.
    let agent = {
        let slot = state.agent.read().await;
        slot.running()
            .ok_or_else(|| AgentError::NotRunning(slot.status()))?
    };
    let twilio = state.twilio.clone().ok_or(DeliveryError::NotConfigured)?;

    let reply = agent.compose_reply(&webhook.from, &webhook.body).await;
    twilio.send_whatsapp(&webhook.from, &reply).await?;

    info!(to = %webhook.from, "delivered WhatsApp reply");
    Ok(ApiResponse::success(
        WebhookData { delivered: true },
        request_id(),
        started.elapsed().as_millis() as u64,
    ))
}
