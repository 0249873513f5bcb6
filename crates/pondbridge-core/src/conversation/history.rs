//! Sliding-window conversation history for a single counterparty.
//!
//! Histories hold user/assistant turn pairs only; the system instruction
//! is injected at prompt-assembly time and never stored.

use std::time::Instant;

use pondbridge_types::llm::Turn;

/// Maximum number of stored turns per counterparty (5 exchanges).
pub const MAX_STORED_TURNS: usize = 10;

/// Ordered sequence of prior turns for one counterparty.
///
/// Turns are strictly chronological. Whenever appending a pair would
/// bring the length above [`MAX_STORED_TURNS`], the oldest pair is
/// evicted first, keeping a sliding window of the most recent exchanges.
#[derive(Debug)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
    last_active: Instant,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
        }
    }

    /// Append one user/assistant exchange, evicting the oldest pairs
    /// until the stored length is back within the window.
    pub fn push_exchange(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::assistant(assistant_text));
        while self.turns.len() > MAX_STORED_TURNS {
            self.turns.drain(..2);
        }
        self.last_active = Instant::now();
    }

    /// Stored turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of stored turns (not exchanges).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// When this history was last read-or-appended by the composer.
    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// Record activity without appending (the composer touches the
    /// history even when the provider call fails).
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pondbridge_types::llm::Role;

    #[test]
    fn test_new_history_is_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_push_exchange_appends_user_then_assistant() {
        let mut history = ConversationHistory::new();
        history.push_exchange("What's the BTC sentiment today?", "Bullish.");

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].role, Role::User);
        assert_eq!(history.turns()[0].content, "What's the BTC sentiment today?");
        assert_eq!(history.turns()[1].role, Role::Assistant);
        assert_eq!(history.turns()[1].content, "Bullish.");
    }

    #[test]
    fn test_length_is_exactly_min_2n_10() {
        let mut history = ConversationHistory::new();
        for n in 1..=8u32 {
            history.push_exchange(format!("q{n}"), format!("a{n}"));
            let expected = std::cmp::min(2 * n as usize, MAX_STORED_TURNS);
            assert_eq!(history.len(), expected, "after {n} exchanges");
        }
    }

    #[test]
    fn test_oldest_pair_evicted_first() {
        let mut history = ConversationHistory::new();
        for n in 1..=6 {
            history.push_exchange(format!("q{n}"), format!("a{n}"));
        }

        // Window holds exchanges 2..=6; the first exchange is gone.
        assert_eq!(history.len(), MAX_STORED_TURNS);
        assert_eq!(history.turns()[0].content, "q2");
        assert_eq!(history.turns()[1].content, "a2");
        assert_eq!(history.turns()[8].content, "q6");
        assert_eq!(history.turns()[9].content, "a6");
    }

    #[test]
    fn test_chronological_order_no_gaps() {
        let mut history = ConversationHistory::new();
        for n in 1..=4 {
            history.push_exchange(format!("q{n}"), format!("a{n}"));
        }

        let contents: Vec<&str> = history.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["q1", "a1", "q2", "a2", "q3", "a3", "q4", "a4"]);
    }

    #[test]
    fn test_never_contains_system_turn() {
        let mut history = ConversationHistory::new();
        for n in 1..=7 {
            history.push_exchange(format!("q{n}"), format!("a{n}"));
        }
        assert!(history.turns().iter().all(|t| t.role != Role::System));
    }
}
