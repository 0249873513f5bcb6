//! Concurrent map of counterparty id to conversation history.
//!
//! Each entry carries its own `tokio::sync::Mutex` so that
//! read-then-append is atomic per counterparty without serializing
//! unrelated counterparties behind a global lock.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::history::ConversationHistory;

/// Maps counterparty ids to their conversation histories.
///
/// Entries are created lazily on first access and live for the process
/// lifetime unless pruned by [`ConversationStore::prune_idle`]. The
/// store exclusively owns all histories; callers mutate them only
/// through the handles it returns.
#[derive(Debug, Default)]
pub struct ConversationStore {
    histories: DashMap<String, Arc<Mutex<ConversationHistory>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            histories: DashMap::new(),
        }
    }

    /// Get or create the history for a counterparty.
    ///
    /// Idempotent: two calls for the same id return handles to the same
    /// underlying history. Callers that need read-then-append atomicity
    /// hold the entry's lock across the whole operation.
    pub fn history(&self, id: &str) -> Arc<Mutex<ConversationHistory>> {
        self.histories
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationHistory::new())))
            .clone()
    }

    /// Append one user/assistant exchange to the identified history.
    ///
    /// Convenience wrapper over [`ConversationStore::history`] for
    /// callers that do not already hold the entry lock.
    pub async fn append_exchange(&self, id: &str, user_text: &str, assistant_text: &str) {
        let handle = self.history(id);
        let mut history = handle.lock().await;
        history.push_exchange(user_text, assistant_text);
    }

    /// Number of counterparties currently tracked.
    pub fn counterparty_count(&self) -> usize {
        self.histories.len()
    }

    /// Evict counterparty entries idle for longer than `max_idle`.
    ///
    /// An entry is kept regardless of its timestamp while a handle to it
    /// is outstanding: a composer between fetching the handle and taking
    /// the lock must still find its entry in the map, or the exchange it
    /// appends would land in an orphaned history.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let before = self.histories.len();
        self.histories.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(history) => history.last_active().elapsed() <= max_idle,
                Err(_) => true,
            }
        });
        let evicted = before - self.histories.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.histories.len(), "pruned idle conversations");
        }
        evicted
    }
}
