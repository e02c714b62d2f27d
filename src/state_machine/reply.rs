//! Classification of a transport reply

use crate::llm::ToolUse;
use crate::system_prompt::RESOLUTION_SENTINEL;

/// What a reply asks the engine to do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyKind<'a> {
    /// The text contains the sentinel phrase; a fenced file should follow
    Resolution(&'a str),
    /// The model wants to read a file first
    ToolCall(&'a ToolUse),
    /// No text and no tool call
    Empty,
    /// Anything else is a question for the human
    Question(&'a str),
}

/// Classify a reply. Rules apply in order: sentinel, tool call, empty,
/// question.
///
/// The sentinel is matched as a plain substring anywhere in the text, so a
/// reply that merely quotes the phrase still counts as a resolution attempt.
pub fn classify<'a>(content: Option<&'a str>, tool_uses: &'a [ToolUse]) -> ReplyKind<'a> {
    if let Some(text) = content {
        if text.contains(RESOLUTION_SENTINEL) {
            return ReplyKind::Resolution(text);
        }
    }

    if let Some(first) = tool_uses.first() {
        return ReplyKind::ToolCall(first);
    }

    match content {
        Some(text) if !text.is_empty() => ReplyKind::Question(text),
        _ => ReplyKind::Empty,
    }
}
