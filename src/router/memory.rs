//! Bounded conversation memory shared by every routing branch.
//!
//! [`ConversationMemory`] keeps whole (user, assistant) pairs in insertion
//! order and evicts the oldest pair once `max_pairs` is exceeded.  Turns
//! can only be added through [`remember`](ConversationMemory::remember),
//! which writes both halves of a pair at once, so the log never holds an
//! unpaired turn and its length is always even.

use std::collections::VecDeque;

use crate::llm::ChatMessage;

/// Rolling window of conversation turns.
///
/// # Example
/// ```rust
/// use waldo_assistant::router::ConversationMemory;
///
/// let mut memory = ConversationMemory::new(2);
/// memory.remember("hi", "hello!");
/// assert_eq!(memory.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<ChatMessage>,
    max_pairs: usize,
}

impl ConversationMemory {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Keep at most `max_pairs` exchanges (at least one).
    pub fn new(max_pairs: usize) -> Self {
        let max_pairs = max_pairs.max(1);
        Self {
            turns: VecDeque::with_capacity(max_pairs * 2 + 2),
            max_pairs,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append one exchange, then drop the oldest pairs beyond the cap.
    pub fn remember(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push_back(ChatMessage::user(user));
        self.turns.push_back(ChatMessage::assistant(assistant));

        while self.turns.len() > self.max_pairs * 2 {
            self.turns.pop_front();
            self.turns.pop_front();
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Turns oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &ChatMessage> {
        self.turns.iter()
    }

    /// Owned copy of the turns, oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.turns.iter().cloned().collect()
    }

    /// Number of turns (always even).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(20)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
