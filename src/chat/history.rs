//! Bounded conversation history.

use std::collections::VecDeque;

use crate::chat::engine::Turn;

/// Maximum turns retained, five user/assistant exchanges.
pub const MAX_TURNS: usize = 10;

/// Sliding window over the most recent conversation turns.
///
/// Only final user and assistant turns are stored; intermediate tool
/// traffic is not. Once full, pushing a new turn evicts the oldest.
#[derive(Debug)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TURNS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, turn: Turn) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
