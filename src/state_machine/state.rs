//! Dialogue state types

use crate::conflicts::ConflictedFile;
use crate::llm::LlmMessage;
#[cfg(test)]
use crate::llm::MessageRole;
use crate::tools::repo_relative_components;
use std::path::Path;

/// Immutable inputs for one file's dialogue
#[derive(Debug, Clone)]
pub struct DialogueContext {
    pub file: ConflictedFile,
    pub merge_from: String,
    pub merge_to: String,
    /// Merge notes gathered from earlier files; empty for the first file
    pub notes: String,
    /// Optional ceiling on transport calls for this file
    pub max_turns: Option<u32>,
}

impl DialogueContext {
    pub fn new(
        file: ConflictedFile,
        merge_from: impl Into<String>,
        merge_to: impl Into<String>,
    ) -> Self {
        Self {
            file,
            merge_from: merge_from.into(),
            merge_to: merge_to.into(),
            notes: String::new(),
            max_turns: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_max_turns(mut self, max_turns: Option<u32>) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Whether `filename` names the file under resolution.
    ///
    /// Paths are compared after resolving `.` and `..`, the same way the
    /// file tool resolves them, so `./src/a.rs` and `lib/../src/a.rs` both
    /// match `src/a.rs`.
    pub fn is_current_file(&self, filename: &str) -> bool {
        match (
            repo_relative_components(Path::new(filename)),
            repo_relative_components(Path::new(&self.file.path)),
        ) {
            (Some(requested), Some(current)) => requested == current,
            _ => false,
        }
    }
}

/// Dialogue state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    /// Nothing sent yet
    Init,

    /// Waiting on the transport; `turn` counts transport calls so far
    AwaitingReply { turn: u32 },

    /// Reading a file on the model's behalf
    ToolExecuting { turn: u32, filename: String },

    /// The model asked a question; waiting on a console line
    AwaitingHuman { turn: u32, question: String },

    Resolved { content: String },

    /// The human typed `exit`
    Aborted,

    /// The optional turn ceiling was reached
    Exhausted,

    /// The reply carried the sentinel phrase but no fenced file
    MalformedResolution { reply: String },
}

impl DialogueState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Init => "init",
            DialogueState::AwaitingReply { .. } => "awaiting_reply",
            DialogueState::ToolExecuting { .. } => "tool_executing",
            DialogueState::AwaitingHuman { .. } => "awaiting_human",
            DialogueState::Resolved { .. } => "resolved",
            DialogueState::Aborted => "aborted",
            DialogueState::Exhausted => "exhausted",
            DialogueState::MalformedResolution { .. } => "malformed_resolution",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogueState::Resolved { .. }
                | DialogueState::Aborted
                | DialogueState::Exhausted
                | DialogueState::MalformedResolution { .. }
        )
    }

    /// The outcome of a finished dialogue. `None` while the dialogue is
    /// still running and for a malformed resolution, which is an error.
    pub fn outcome(&self) -> Option<DialogueOutcome> {
        match self {
            DialogueState::Resolved { content } => Some(DialogueOutcome::Resolved {
                content: content.clone(),
            }),
            DialogueState::Aborted => Some(DialogueOutcome::Aborted),
            DialogueState::Exhausted => Some(DialogueOutcome::Exhausted),
            _ => None,
        }
    }
}

/// Terminal value of a dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueOutcome {
    Resolved { content: String },
    Aborted,
    Exhausted,
}

/// Ordered, append-only message history for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<LlmMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of turns with the given role
    #[cfg(test)]
    pub fn count_role(&self, role: MessageRole) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

impl From<Vec<LlmMessage>> for Conversation {
    fn from(messages: Vec<LlmMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(path: &str) -> DialogueContext {
        DialogueContext::new(
            ConflictedFile::new(path, "<<<<<<<\n"),
            "branch-A",
            "branch-B",
        )
    }

    #[test]
    fn current_file_ignores_dot_segments() {
        let ctx = context("src/app.py");
        assert!(ctx.is_current_file("src/app.py"));
        assert!(ctx.is_current_file("./src/app.py"));
        assert!(ctx.is_current_file("src//app.py"));
        assert!(!ctx.is_current_file("src/app.pyc"));
        assert!(!ctx.is_current_file("app.py"));
    }

    #[test]
    fn current_file_resolves_parent_segments() {
        let ctx = context("src/app.py");
        assert!(ctx.is_current_file("lib/../src/app.py"));
        assert!(ctx.is_current_file("src/sub/../app.py"));
        assert!(!ctx.is_current_file("../src/app.py"));
        assert!(!ctx.is_current_file("/src/app.py"));
    }

    #[test]
    fn terminal_states() {
        assert!(!DialogueState::Init.is_terminal());
        assert!(!DialogueState::AwaitingReply { turn: 1 }.is_terminal());
        assert!(DialogueState::Aborted.is_terminal());
        assert!(DialogueState::MalformedResolution {
            reply: String::new()
        }
        .is_terminal());
        assert_eq!(
            DialogueState::MalformedResolution {
                reply: String::new()
            }
            .outcome(),
            None
        );
        assert_eq!(
            DialogueState::Resolved {
                content: "x".into()
            }
            .outcome(),
            Some(DialogueOutcome::Resolved {
                content: "x".into()
            })
        );
    }

    #[test]
    fn conversation_counts_roles() {
        let mut conversation = Conversation::new();
        conversation.push(LlmMessage::system("s"));
        conversation.push(LlmMessage::user("u"));
        conversation.push(LlmMessage::assistant("a"));
        conversation.push(LlmMessage::user("u2"));
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.count_role(MessageRole::User), 2);
    }
}
