//! Inbound/outbound message shapes exchanged with transports.
//!
//! A transport (the P2P gateway client or the WhatsApp webhook adapter)
//! hands the core an [`InboundMessage`] and delivers the reply text
//! outward with an optional [`DeliveryContext`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message received from a remote counterparty via some transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Opaque counterparty identifier (P2P agent address or phone number).
    pub from_id: String,
    /// Message text.
    pub content: String,
    /// Optional conversation thread identifier supplied by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// When the transport received the message.
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Create an inbound message stamped with the current time.
    pub fn new(from_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            content: content.into(),
            conversation_id: None,
            received_at: Utc::now(),
        }
    }

    /// Attach a conversation thread identifier.
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// Context a transport needs to route an outbound reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryContext {
    /// Conversation thread to reply into, if the transport threads messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl DeliveryContext {
    /// Build the delivery context for replying to an inbound message.
    pub fn reply_to(inbound: &InboundMessage) -> Self {
        Self {
            conversation_id: inbound.conversation_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_json_roundtrip() {
        let msg = InboundMessage::new("alice", "What's the BTC sentiment today?")
            .with_conversation_id("conv-7");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"from_id\":\"alice\""));
        assert!(json.contains("\"conversation_id\":\"conv-7\""));

        let parsed: InboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.from_id, "alice");
        assert_eq!(parsed.conversation_id.as_deref(), Some("conv-7"));
    }

    #[test]
    fn test_inbound_message_omits_missing_conversation_id() {
        let msg = InboundMessage::new("whatsapp:+15551234567", "hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("conversation_id"));
    }

    #[test]
    fn test_delivery_context_reply_to_carries_thread() {
        let inbound = InboundMessage::new("alice", "hello").with_conversation_id("conv-9");
        let ctx = DeliveryContext::reply_to(&inbound);
        assert_eq!(ctx.conversation_id.as_deref(), Some("conv-9"));

        let unthreaded = InboundMessage::new("bob", "hello");
        let ctx = DeliveryContext::reply_to(&unthreaded);
        assert!(ctx.conversation_id.is_none());
    }
}
