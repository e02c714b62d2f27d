//! Merge notes: human clarifications carried from one file to the next
//!
//! After each file's dialogue, every human reply except the seed turn is
//! paired with the assistant turn right before it and appended as a block:
//!
//! ```text
//! --------------------------------------------------------------------------------
//! Assistant: <question>
//!
//! User: <answer>
//! --------------------------------------------------------------------------------
//! ```
//!
//! The buffer only ever grows, so later files see at least as much context as
//! earlier ones.

use crate::llm::{LlmMessage, MessageRole};
use crate::state_machine::Conversation;

const SEPARATOR_WIDTH: usize = 80;

/// Append-only clarification transcript for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeNotes {
    text: String,
}

impl MergeNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append the clarification blocks from a finished dialogue.
    ///
    /// Returns how many blocks were added.
    pub fn absorb(&mut self, conversation: &Conversation) -> usize {
        let blocks = clarification_blocks(conversation.messages());
        for block in &blocks {
            self.text.push_str(block);
        }
        blocks.len()
    }
}

/// Render one block per human reply after the seed turn.
pub fn clarification_blocks(messages: &[LlmMessage]) -> Vec<String> {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.role == MessageRole::User)
        .skip(1)
        .filter_map(|(i, reply)| {
            let preceding = &messages[i.checked_sub(1)?];
            Some(format!(
                "\n{separator}\nAssistant: {}\n\nUser: {}\n{separator}",
                preceding.content, reply.content
            ))
        })
        .collect()
}
