//! Reply composer: assembles the prompt for one inbound message,
//! invokes the completion provider, and maintains conversation memory.
//!
//! The composer implements the "always respond" policy: every inbound
//! message yields a non-empty reply string. Provider failures, timeouts,
//! and empty completions are all downgraded to fixed fallback strings
//! and never surface to the transport layer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use pondbridge_types::config::LlmSettings;
use pondbridge_types::llm::{CompletionRequest, Turn};

use crate::conversation::ConversationStore;
use crate::llm::{CompletionProvider, TokenBucket};

/// Fixed system instruction defining the agent's persona and scope.
pub const SYSTEM_PROMPT: &str = "\
You are a Market Sentiment Analysis agent in the OpenPond P2P network.
Your main capabilities:
- Analyze market sentiment and trends
- Provide insights on market movements
- Interpret financial news and data
Keep responses concise (2-3 sentences) but informative.
Your main traits:
- Professional and analytical
- Data-driven in your responses
- Focus on market sentiment and trends
- Expert in financial markets and crypto";

/// Fallback reply when the provider call fails or times out.
pub const ERROR_FALLBACK: &str = "Sorry, I encountered an error processing your message.";

/// Fallback reply when the provider succeeds but returns no content.
pub const EMPTY_FALLBACK: &str = "Sorry, I couldn't process that request.";

/// Completion parameters the composer sends on every request.
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Hard timeout on the provider call; expiry counts as a provider
    /// failure (error fallback, no history mutation).
    pub request_timeout: Duration,
}

impl From<&LlmSettings> for ComposerSettings {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
        }
    }
}

/// Produces a reply string for one inbound message.
///
/// Holds the counterparty's history lock across the whole
/// read-assemble-complete-append sequence, so concurrent messages from
/// the same counterparty are serialized while distinct counterparties
/// proceed in parallel.
pub struct ReplyComposer<P> {
    provider: P,
    store: Arc<ConversationStore>,
    limiter: TokenBucket,
    settings: ComposerSettings,
}

impl<P: CompletionProvider> ReplyComposer<P> {
    pub fn new(
        provider: P,
        store: Arc<ConversationStore>,
        limiter: TokenBucket,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            provider,
            store,
            limiter,
            settings,
        }
    }

    /// The conversation store backing this composer.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Compose a reply to `message_text` from the given counterparty.
    ///
    /// Always returns a non-empty string. The exchange is recorded into
    /// history only when the provider returned usable content.
    pub async fn compose(&self, from_id: &str, message_text: &str) -> String {
        let handle = self.store.history(from_id);
        let mut history = handle.lock().await;

        let mut messages = history.turns().to_vec();
        messages.push(Turn::user(message_text));
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
        };

        self.limiter.acquire().await;

        let response = match tokio::time::timeout(
            self.settings.request_timeout,
            self.provider.complete(&request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(counterparty = %from_id, error = %err, "completion provider failed");
                history.touch();
                return ERROR_FALLBACK.to_string();
            }
            Err(_) => {
                warn!(
                    counterparty = %from_id,
                    timeout_ms = self.settings.request_timeout.as_millis() as u64,
                    "completion provider timed out"
                );
                history.touch();
                return ERROR_FALLBACK.to_string();
            }
        };

        if response.content.is_empty() {
            // Treated like a failure: the fallback is returned but never
            // recorded, keeping the history rule uniform across both
            // degraded paths.
            warn!(counterparty = %from_id, "completion provider returned empty content");
            history.touch();
            return EMPTY_FALLBACK.to_string();
        }

        debug!(
            counterparty = %from_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "composed reply"
        );
        history.push_exchange(message_text, &response.content);
        response.content
    }
}
