//! Application state shared across HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::warn;

use pondbridge_core::agent::{ComposerSettings, ReplyComposer, SentimentAgent};
use pondbridge_core::conversation::ConversationStore;
use pondbridge_core::llm::TokenBucket;
use pondbridge_infra::config::{load_service_config, resolve_data_dir};
use pondbridge_infra::llm::OpenAiCompatibleProvider;
use pondbridge_infra::transport::HttpGatewayTransport;
use pondbridge_infra::twilio::TwilioClient;
use pondbridge_types::agent::{AgentCredentials, AgentStatus};
use pondbridge_types::config::ServiceConfig;

/// The concrete agent the HTTP layer manages: OpenAI-compatible provider
/// over the HTTP gateway transport.
pub type GatewayAgent = SentimentAgent<OpenAiCompatibleProvider, HttpGatewayTransport>;

/// Lifecycle slot for the single managed agent.
///
/// The slot starts `Uninitialized`, moves to `Running` on a successful
/// `/initialize`, and to `Stopped` on `/stop`. Handlers inspect the slot
/// instead of dereferencing a nullable global.
pub enum AgentSlot {
    Uninitialized,
    Running(Arc<GatewayAgent>),
    Stopped,
}

impl AgentSlot {
    pub fn status(&self) -> AgentStatus {
        match self {
            AgentSlot::Uninitialized => AgentStatus::Uninitialized,
            AgentSlot::Running(_) => AgentStatus::Running,
            AgentSlot::Stopped => AgentStatus::Stopped,
        }
    }

    /// The running agent, if any.
    pub fn running(&self) -> Option<Arc<GatewayAgent>> {
        match self {
            AgentSlot::Running(agent) => Some(Arc::clone(agent)),
            _ => None,
        }
    }
}

/// Shared application state, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration loaded at startup.
    pub config: Arc<ServiceConfig>,
    /// Twilio sender; `None` when credentials were not configured.
    pub twilio: Option<Arc<TwilioClient>>,
    /// The managed agent slot.
    pub agent: Arc<RwLock<AgentSlot>>,
}

impl AppState {
    /// Load configuration and construct the initial (uninitialized) state.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_service_config(&data_dir).await;

        let twilio = if config.twilio.is_configured() {
            Some(Arc::new(TwilioClient::from_settings(&config.twilio)?))
        } else {
            warn!("Twilio credentials not configured, WhatsApp delivery disabled");
            None
        };

        Ok(Self {
            config: Arc::new(config),
            twilio,
            agent: Arc::new(RwLock::new(AgentSlot::Uninitialized)),
        })
    }

    /// Assemble a fresh agent from operator credentials and configuration.
    ///
    /// Each initialization gets its own provider, transport, and empty
    /// conversation store; nothing survives a stop/initialize cycle.
    pub fn build_agent(&self, credentials: &AgentCredentials) -> GatewayAgent {
        let provider = OpenAiCompatibleProvider::openai(credentials.provider_api_key.clone());

        let base_url = credentials
            .gateway_url
            .clone()
            .unwrap_or_else(|| self.config.gateway.base_url.clone());
        let transport = Arc::new(HttpGatewayTransport::new(
            &self.config.gateway,
            base_url,
            credentials.private_key.clone(),
        ));

        let composer = ReplyComposer::new(
            provider,
            Arc::new(ConversationStore::new()),
            TokenBucket::per_minute(
                self.config.llm.requests_per_minute,
                self.config.llm.burst,
            ),
            ComposerSettings::from(&self.config.llm),
        );

        SentimentAgent::new(
            composer,
            transport,
            Duration::from_secs(self.config.conversation.idle_eviction_secs),
        )
    }
}
