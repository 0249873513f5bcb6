//! Twilio REST client for outbound WhatsApp delivery.
//!
//! Posts form-encoded message creation requests to the Twilio Messages
//! endpoint with basic auth. Only the WhatsApp channel is used; both
//! addresses are `whatsapp:`-prefixed on the wire.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use pondbridge_types::config::TwilioSettings;
use pondbridge_types::error::DeliveryError;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Error body returned by the Twilio API.
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: String,
}

/// Outbound WhatsApp sender backed by the Twilio REST API.
///
/// Does NOT derive Debug: the auth token lives inside.
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    whatsapp_number: String,
    api_base: String,
}

impl TwilioClient {
    /// Build a client from settings; fails when any credential is unset.
    pub fn from_settings(settings: &TwilioSettings) -> Result<Self, DeliveryError> {
        let (Some(account_sid), Some(auth_token), Some(whatsapp_number)) = (
            settings.account_sid.clone(),
            settings.auth_token.clone(),
            settings.whatsapp_number.clone(),
        ) else {
            return Err(DeliveryError::NotConfigured);
        };

        Ok(Self {
            http: reqwest::Client::new(),
            account_sid,
            auth_token,
            whatsapp_number,
            api_base: TWILIO_API_BASE.to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }

    /// Deliver `body` to `to` over WhatsApp.
    ///
    /// `to` may arrive with or without the `whatsapp:` prefix; Twilio
    /// webhooks supply it prefixed, the P2P path does not.
    pub async fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let params = [
            ("To", whatsapp_addr(to)),
            ("From", whatsapp_addr(&self.whatsapp_number)),
            ("Body", body.to_string()),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&params)
            .send()
            .await
            .map_err(|err| DeliveryError::Request(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<TwilioErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Ensure a phone address carries the `whatsapp:` channel prefix.
fn whatsapp_addr(value: &str) -> String {
    if value.starts_with("whatsapp:") {
        value.to_string()
    } else {
        format!("whatsapp:{value}")
    }
}
