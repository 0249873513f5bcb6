//! Agent lifecycle: transport connection, inbound message loop, and
//! periodic conversation pruning.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use pondbridge_types::error::AgentError;
use pondbridge_types::message::{DeliveryContext, InboundMessage};

use crate::agent::ReplyComposer;
use crate::llm::CompletionProvider;
use crate::transport::PeerTransport;

/// The market-sentiment agent: one composer, one peer transport, one
/// background worker draining the inbound mailbox.
///
/// The worker slot pairs the handle with its cancellation token; a new
/// token is minted on every `start`, so a stopped agent can be started
/// again.
pub struct SentimentAgent<P, T> {
    composer: Arc<ReplyComposer<P>>,
    transport: Arc<T>,
    worker: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
    idle_eviction: Duration,
}

impl<P, T> SentimentAgent<P, T>
where
    P: CompletionProvider + 'static,
    T: PeerTransport + 'static,
{
    pub fn new(composer: ReplyComposer<P>, transport: Arc<T>, idle_eviction: Duration) -> Self {
        Self {
            composer: Arc::new(composer),
            transport,
            worker: Mutex::new(None),
            idle_eviction,
        }
    }

    /// Connect the transport and start draining inbound messages.
    ///
    /// A connect failure is fatal to initialization and is returned to
    /// the caller; nothing is spawned in that case.
    pub async fn start(&self) -> Result<(), AgentError> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return Err(AgentError::AlreadyRunning);
        }

        let mut inbound = self.transport.connect().await?;
        info!("agent connected to gateway");

        let composer = Arc::clone(&self.composer);
        let transport = Arc::clone(&self.transport);
        let shutdown = CancellationToken::new();
        let worker_shutdown = shutdown.clone();
        let idle_eviction = self.idle_eviction;

        let handle = tokio::spawn(async move {
            let mut prune_tick = tokio::time::interval(idle_eviction);
            prune_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            prune_tick.tick().await; // first tick fires immediately

            loop {
                tokio::select! {
                    () = worker_shutdown.cancelled() => break,
                    _ = prune_tick.tick() => {
                        composer.store().prune_idle(idle_eviction);
                    }
                    message = inbound.recv() => match message {
                        Some(message) => {
                            Self::handle_message(&composer, &transport, message).await;
                        }
                        None => {
                            warn!("transport mailbox closed, stopping inbound loop");
                            break;
                        }
                    },
                }
            }
        });

        *worker = Some((shutdown, handle));
        Ok(())
    }

    /// Compose and deliver a reply for one inbound message.
    ///
    /// Malformed messages are logged and silently dropped (no reply).
    /// Delivery failures are logged; the message is not retried.
    async fn handle_message(
        composer: &ReplyComposer<P>,
        transport: &T,
        message: InboundMessage,
    ) {
        if message.from_id.trim().is_empty() || message.content.trim().is_empty() {
            warn!(
                from = %message.from_id,
                "dropping malformed inbound message"
            );
            return;
        }

        let reply = composer.compose(&message.from_id, &message.content).await;
        let context = DeliveryContext::reply_to(&message);
        if let Err(err) = transport.send(&message.from_id, &reply, &context).await {
            error!(to = %message.from_id, error = %err, "failed to deliver reply");
        }
    }

    /// Compose a reply without delivering it over the peer transport.
    ///
    /// Used by the WhatsApp webhook path, which delivers via the
    /// telephony provider instead.
    pub async fn compose_reply(&self, from_id: &str, message_text: &str) -> String {
        self.composer.compose(from_id, message_text).await
    }

    /// Stop the worker and release the transport. Idempotent.
    pub async fn stop(&self) {
        if let Some((shutdown, handle)) = self.worker.lock().await.take() {
            shutdown.cancel();
            if let Err(err) = handle.await {
                warn!(error = %err, "inbound worker did not shut down cleanly");
            }
        }
        self.transport.disconnect().await;
        info!("agent stopped");
    }
}
