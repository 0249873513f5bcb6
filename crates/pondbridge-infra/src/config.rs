//! Service configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.pondbridge/` in
//! production) and deserializes it into [`ServiceConfig`]. Falls back
//! to defaults when the file is missing or malformed, then overlays
//! Twilio credentials from the environment.

use std::path::{Path, PathBuf};

use pondbridge_types::config::ServiceConfig;

/// Resolve the data directory: `PONDBRIDGE_DATA_DIR` if set, otherwise
/// `~/.pondbridge`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PONDBRIDGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pondbridge")
}

/// Load service configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ServiceConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Twilio credentials missing from the file are filled from
///   `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, and `TWILIO_WHATSAPP_NUMBER`.
pub async fn load_service_config(data_dir: &Path) -> ServiceConfig {
    let config_path = data_dir.join("config.toml");

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<ServiceConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                ServiceConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            ServiceConfig::default()
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            ServiceConfig::default()
        }
    };

    overlay_twilio_env(&mut config);
    config
}

/// Fill unset Twilio fields from the environment.
fn overlay_twilio_env(config: &mut ServiceConfig) {
    if config.twilio.account_sid.is_none()
        && let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID")
    {
        config.twilio.account_sid = Some(sid);
    }
    if config.twilio.auth_token.is_none()
        && let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN")
    {
        config.twilio.auth_token = Some(token.into());
    }
    if config.twilio.whatsapp_number.is_none()
        && let Ok(number) = std::env::var("TWILIO_WHATSAPP_NUMBER")
    {
        config.twilio.whatsapp_number = Some(number);
    }
}
