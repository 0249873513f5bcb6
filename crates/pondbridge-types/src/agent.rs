//! Agent lifecycle and credential types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AgentError;

/// Lifecycle state of the agent slot held by the HTTP layer.
///
/// Requests arriving while the slot is `Uninitialized` or `Stopped`
/// receive a defined error envelope rather than a null dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Uninitialized,
    Running,
    Stopped,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Uninitialized => write!(f, "uninitialized"),
            AgentStatus::Running => write!(f, "running"),
            AgentStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Credentials supplied by the operator at initialization time.
///
/// Opaque to the core beyond non-emptiness; each value is handed to the
/// collaborator that owns it (gateway transport, completion provider).
///
/// Does NOT derive Debug output for the secret fields -- the private key
/// and API key are wrapped in [`SecretString`] so accidental logging
/// renders them redacted.
#[derive(Clone, Deserialize)]
pub struct AgentCredentials {
    /// Private key identifying the agent on the P2P network.
    pub private_key: SecretString,
    /// API key for the completion provider.
    pub provider_api_key: SecretString,
    /// Override the default gateway base URL.
    #[serde(default)]
    pub gateway_url: Option<String>,
}

impl AgentCredentials {
    /// Validate that the required credentials are non-empty.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.private_key.expose_secret().trim().is_empty() {
            return Err(AgentError::MissingCredential("private_key"));
        }
        if self.provider_api_key.expose_secret().trim().is_empty() {
            return Err(AgentError::MissingCredential("provider_api_key"));
        }
        if let Some(url) = &self.gateway_url
            && url.trim().is_empty()
        {
            return Err(AgentError::MissingCredential("gateway_url"));
        }
        Ok(())
    }
}

impl fmt::Debug for AgentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentCredentials")
            .field("private_key", &"<redacted>")
            .field("provider_api_key", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(private_key: &str, api_key: &str) -> AgentCredentials {
        AgentCredentials {
            private_key: private_key.into(),
            provider_api_key: api_key.into(),
            gateway_url: None,
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AgentStatus::Uninitialized.to_string(), "uninitialized");
        assert_eq!(AgentStatus::Running.to_string(), "running");
        assert_eq!(AgentStatus::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_validate_accepts_non_empty() {
        assert!(credentials("0xabc", "sk-test").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_private_key() {
        let err = credentials("  ", "sk-test").validate().unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential("private_key")));
    }

    #[test]
    fn test_validate_rejects_empty_api_key() {
        let err = credentials("0xabc", "").validate().unwrap_err();
        assert!(matches!(
            err,
            AgentError::MissingCredential("provider_api_key")
        ));
    }

    #[test]
    fn test_validate_rejects_blank_gateway_url() {
        let mut creds = credentials("0xabc", "sk-test");
        creds.gateway_url = Some("   ".to_string());
        let err = creds.validate().unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential("gateway_url")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = credentials("0xdeadbeef", "sk-live-secret");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("0xdeadbeef"));
        assert!(!debug.contains("sk-live-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"private_key":"0xabc","provider_api_key":"sk-test","gateway_url":"http://localhost:3000"}"#;
        let creds: AgentCredentials = serde_json::from_str(json).unwrap();
        assert!(creds.validate().is_ok());
        assert_eq!(creds.gateway_url.as_deref(), Some("http://localhost:3000"));
    }
}
