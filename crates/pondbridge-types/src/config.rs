//! Service configuration loaded from `config.toml` plus environment
//! overrides for secrets.

use secrecy::SecretString;
use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub llm: LlmSettings,
    pub gateway: GatewaySettings,
    pub conversation: ConversationSettings,
    pub twilio: TwilioSettings,
}

/// Completion provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model identifier sent on every completion request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token cap per request.
    pub max_tokens: u32,
    /// Hard timeout on each provider call; a timeout is treated as a
    /// provider failure.
    pub request_timeout_ms: u64,
    /// Sustained outbound request rate to the provider.
    pub requests_per_minute: u32,
    /// Token-bucket burst size.
    pub burst: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            request_timeout_ms: 30_000,
            requests_per_minute: 60,
            burst: 5,
        }
    }
}

/// P2P gateway transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Gateway base URL; an initialize request may override it.
    pub base_url: String,
    /// Display name registered with the gateway.
    pub agent_name: String,
    /// Delay between inbound polls when the gateway returns no messages.
    pub poll_interval_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            agent_name: "Market Sentiment Agent".to_string(),
            poll_interval_ms: 1_000,
        }
    }
}

/// Conversation store retention settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Counterparty entries idle longer than this are pruned wholesale.
    pub idle_eviction_secs: u64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            idle_eviction_secs: 3_600,
        }
    }
}

/// Twilio credentials and sender number for WhatsApp delivery.
///
/// All fields are optional in `config.toml`; the loader fills them from
/// `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, and `TWILIO_WHATSAPP_NUMBER`
/// when unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub auth_token: Option<SecretString>,
    /// Sender number without the `whatsapp:` prefix (e.g. "+14155238886").
    pub whatsapp_number: Option<String>,
}

impl TwilioSettings {
    /// Whether all values needed for outbound delivery are present.
    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.whatsapp_number.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!((config.llm.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.llm.request_timeout_ms, 30_000);
        assert_eq!(config.gateway.base_url, "http://localhost:3000");
        assert_eq!(config.conversation.idle_eviction_secs, 3_600);
        assert!(!config.twilio.is_configured());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
[llm]
model = "gpt-4o-mini"
requests_per_minute = 30

[twilio]
account_sid = "AC123"
auth_token = "tok"
whatsapp_number = "+14155238886"
"#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.requests_per_minute, 30);
        // Unset fields keep their defaults
        assert_eq!(config.llm.max_tokens, 256);
        assert_eq!(config.gateway.agent_name, "Market Sentiment Agent");
        assert!(config.twilio.is_configured());
    }

    #[test]
    fn test_twilio_partial_is_not_configured() {
        let config: ServiceConfig = toml::from_str(
            r#"
[twilio]
account_sid = "AC123"
"#,
        )
        .unwrap();
        assert!(!config.twilio.is_configured());
    }
}
