//! Session memory
//!
//! Ordered, append-only log of prior user/assistant exchanges, replayed into
//! every draft conversation so the model can perform incremental edits. The
//! log lives for the process lifetime only and records turns in strict
//! user -> assistant pairs; the assistant side is always the *final, audited*
//! bundle, never a raw draft, so the model's visible history stays clean.
//!
//! Growth is bounded: once the exchange window is exceeded, the oldest pairs
//! are dropped whole, which preserves the alternation invariant.

use crate::llm::Message;

/// Maximum number of user/assistant exchanges retained
const DEFAULT_MAX_EXCHANGES: usize = 20;

#[derive(Debug, Clone)]
pub struct SessionMemory {
    turns: Vec<Message>,
    max_exchanges: usize,
}

impl SessionMemory {
    /// Create an empty session with the default window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_MAX_EXCHANGES)
    }

    /// Create an empty session retaining at most `max_exchanges` pairs
    pub fn with_window(max_exchanges: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_exchanges: max_exchanges.max(1),
        }
    }

    /// Record one completed exchange: the user instruction and the serialized
    /// final bundle. Called only after materialization succeeded, so memory
    /// never reflects a turn that does not exist on disk.
    pub fn record_exchange(&mut self, instruction: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Message::user(instruction));
        self.turns.push(Message::assistant(reply));

        // Drop oldest pairs whole to keep user/assistant alternation
        while self.turns.len() > self.max_exchanges * 2 {
            self.turns.drain(..2);
        }
    }

    /// All retained turns, oldest first
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new()
    }
}
