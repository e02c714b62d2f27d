//! Effects produced by state transitions

use crate::llm::LlmMessage;
use serde_json::Value;
use std::fmt;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the conversation
    AppendMessage { message: LlmMessage },

    /// Send the whole conversation to the transport
    RequestLlm,

    /// Read a file on the model's behalf
    ExecuteTool {
        name: String,
        input: Value,
        filename: String,
    },

    /// Show the model's question and read one console line
    AskHuman { question: String },

    /// Print a status block on the console
    Announce(Announcement),
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: LlmMessage::user(content),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: LlmMessage::assistant(content),
        }
    }

    pub fn append_system(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: LlmMessage::system(content),
        }
    }
}

/// Status lines shown to the user as the dialogue moves along
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Checking { path: String },
    Viewing { filename: String },
    /// Text the model wrote before the resolved file
    Resolution { preamble: String },
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::Checking { path } => write!(f, "Checking: {path}"),
            Announcement::Viewing { filename } => write!(f, "Viewing: {filename}"),
            Announcement::Resolution { preamble } => write!(f, "{preamble}"),
        }
    }
}
