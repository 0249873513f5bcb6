//! HTTP gateway client for the P2P agent network.
//!
//! The gateway owns the actual peer-to-peer plumbing; this client
//! registers the agent, long-polls the gateway for inbound messages,
//! and posts outbound replies. Inbound messages are pushed into the
//! mailbox channel returned from `connect`, matching the
//! `PeerTransport` port in pondbridge-core.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pondbridge_core::transport::PeerTransport;
use pondbridge_types::config::GatewaySettings;
use pondbridge_types::error::TransportError;
use pondbridge_types::message::{DeliveryContext, InboundMessage};

/// Buffer size for the inbound message mailbox.
const MAILBOX_BUFFER: usize = 64;

/// Registration request sent to the gateway on connect.
#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    agent_name: &'a str,
    private_key: &'a str,
}

/// Registration response carrying the gateway-assigned agent id.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    agent_id: String,
}

/// One message as delivered by the gateway's poll endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GatewayMessage {
    pub from_agent_id: String,
    pub content: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl From<GatewayMessage> for InboundMessage {
    fn from(msg: GatewayMessage) -> Self {
        let inbound = InboundMessage::new(msg.from_agent_id, msg.content);
        match msg.conversation_id {
            Some(id) => inbound.with_conversation_id(id),
            None => inbound,
        }
    }
}

/// Outbound message body posted to the gateway.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// `PeerTransport` implementation over an OpenPond-style HTTP gateway.
///
/// Does NOT derive Debug: the private key lives inside.
pub struct HttpGatewayTransport {
    http: reqwest::Client,
    base_url: String,
    agent_name: String,
    private_key: SecretString,
    poll_interval: Duration,
    agent_id: StdMutex<Option<String>>,
    poller: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl HttpGatewayTransport {
    pub fn new(settings: &GatewaySettings, base_url: String, private_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_name: settings.agent_name.clone(),
            private_key,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            agent_id: StdMutex::new(None),
            poller: Mutex::new(None),
        }
    }

    fn register_url(&self) -> String {
        format!("{}/v1/agents/register", self.base_url)
    }

    fn messages_url(&self, agent_id: &str) -> String {
        format!("{}/v1/agents/{agent_id}/messages", self.base_url)
    }

    fn unregister_url(&self, agent_id: &str) -> String {
        format!("{}/v1/agents/{agent_id}/unregister", self.base_url)
    }

    fn current_agent_id(&self) -> Option<String> {
        self.agent_id.lock().unwrap().clone()
    }

    /// Poll the gateway once and push any inbound messages to the mailbox.
    ///
    /// Returns false when the mailbox receiver is gone and polling
    /// should stop.
    async fn poll_once(
        http: &reqwest::Client,
        url: &str,
        tx: &mpsc::Sender<InboundMessage>,
    ) -> bool {
        let messages: Vec<GatewayMessage> = match http.get(url).send().await {
            Ok(response) => match response.error_for_status() {
                Ok(response) => response.json().await.unwrap_or_else(|err| {
                    warn!(error = %err, "gateway returned unparseable messages");
                    Vec::new()
                }),
                Err(err) => {
                    warn!(error = %err, "gateway poll rejected");
                    Vec::new()
                }
            },
            Err(err) => {
                warn!(error = %err, "gateway poll failed");
                Vec::new()
            }
        };

        for message in messages {
            if tx.send(message.into()).await.is_err() {
                return false;
            }
        }
        true
    }
}

impl PeerTransport for HttpGatewayTransport {
    async fn connect(&self) -> Result<mpsc::Receiver<InboundMessage>, TransportError> {
        let response = self
            .http
            .post(self.register_url())
            .json(&RegisterRequest {
                agent_name: &self.agent_name,
                private_key: self.private_key.expose_secret(),
            })
            .send()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?
            .error_for_status()
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let registration: RegisterResponse = response
            .json()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        debug!(agent_id = %registration.agent_id, "registered with gateway");
        let poll_url = self.messages_url(&registration.agent_id);
        *self.agent_id.lock().unwrap() = Some(registration.agent_id);

        let (tx, rx) = mpsc::channel(MAILBOX_BUFFER);
        let http = self.http.clone();
        let poll_interval = self.poll_interval;
        let shutdown = CancellationToken::new();
        let poll_shutdown = shutdown.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = poll_shutdown.cancelled() => break,
                    () = tokio::time::sleep(poll_interval) => {
                        if !Self::poll_once(&http, &poll_url, &tx).await {
                            break;
                        }
                    }
                }
            }
        });

        // Replace any previous poller (reconnect case).
        if let Some((old_shutdown, old_handle)) = self.poller.lock().await.replace((shutdown, handle))
        {
            old_shutdown.cancel();
            old_handle.abort();
        }

        Ok(rx)
    }

    async fn send(
        &self,
        to: &str,
        text: &str,
        context: &DeliveryContext,
    ) -> Result<(), TransportError> {
        let agent_id = self.current_agent_id().ok_or(TransportError::Closed)?;

        self.http
            .post(self.messages_url(&agent_id))
            .json(&SendRequest {
                to,
                content: text,
                conversation_id: context.conversation_id.as_deref(),
            })
            .send()
            .await
            .map_err(|err| TransportError::Send {
                to: to.to_string(),
                message: err.to_string(),
            })?
            .error_for_status()
            .map_err(|err| TransportError::Send {
                to: to.to_string(),
                message: err.to_string(),
            })?;

        Ok(())
    }

    async fn disconnect(&self) {
        if let Some((shutdown, handle)) = self.poller.lock().await.take() {
            shutdown.cancel();
            if let Err(err) = handle.await {
                warn!(error = %err, "gateway poller did not shut down cleanly");
            }
        }

        let agent_id = self.agent_id.lock().unwrap().take();
        if let Some(agent_id) = agent_id {
            // Best-effort; the gateway reaps dead registrations anyway.
            if let Err(err) = self.http.post(self.unregister_url(&agent_id)).send().await {
                debug!(error = %err, "gateway unregister failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpGatewayTransport {
        HttpGatewayTransport::new(
            &GatewaySettings::default(),
            "http://localhost:3000/".to_string(),
            "0xabc".into(),
        )
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let transport = transport();
        assert_eq!(
            transport.register_url(),
            "http://localhost:3000/v1/agents/register"
        );
        assert_eq!(
            transport.messages_url("agent-7"),
            "http://localhost:3000/v1/agents/agent-7/messages"
        );
        assert_eq!(
            transport.unregister_url("agent-7"),
            "http://localhost:3000/v1/agents/agent-7/unregister"
        );
    }

    #[test]
    fn test_gateway_message_maps_to_inbound() {
        let wire: GatewayMessage = serde_json::from_str(
            r#"{"from_agent_id":"alice","content":"hello","conversation_id":"conv-1"}"#,
        )
        .unwrap();
        let inbound: InboundMessage = wire.into();
        assert_eq!(inbound.from_id, "alice");
        assert_eq!(inbound.content, "hello");
        assert_eq!(inbound.conversation_id.as_deref(), Some("conv-1"));
    }

    #[test]
    fn test_gateway_message_without_conversation_id() {
        let wire: GatewayMessage =
            serde_json::from_str(r#"{"from_agent_id":"bob","content":"hi"}"#).unwrap();
        let inbound: InboundMessage = wire.into();
        assert!(inbound.conversation_id.is_none());
    }

    #[test]
    fn test_send_request_omits_missing_conversation_id() {
        let body = serde_json::to_string(&SendRequest {
            to: "alice",
            content: "reply",
            conversation_id: None,
        })
        .unwrap();
        assert!(!body.contains("conversation_id"));

        let body = serde_json::to_string(&SendRequest {
            to: "alice",
            content: "reply",
            conversation_id: Some("conv-1"),
        })
        .unwrap();
        assert!(body.contains("\"conversation_id\":\"conv-1\""));
    }

    #[tokio::test]
    async fn test_send_before_connect_is_closed() {
        let transport = transport();
        let err = transport
            .send("alice", "hi", &DeliveryContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        // Idempotent, best-effort: nothing to cancel, nothing to unregister.
        let transport = transport();
        transport.disconnect().await;
        transport.disconnect().await;
    }
}
