//! Pure state transition function

use super::reply::{classify, ReplyKind};
use super::{Announcement, DialogueContext, DialogueState, Effect, Event};
use crate::fence::{self, FenceMatch};
use crate::llm::ToolUse;
use crate::system_prompt::{build_system_prompt, notes_message, seed_message};
use crate::tools::{ToolOutput, VIEW_FILE_CONTENTS};
use serde_json::Value;
use thiserror::Error;

/// Console input that ends the dialogue for the current file
pub const EXIT_COMMAND: &str = "exit";

pub const SELF_VIEW_REJECTION: &str =
    "ERROR: You can't view the same file you're resolving a conflict in.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Event {event} is not valid in state {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &DialogueState,
    context: &DialogueContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (DialogueState::Init, Event::Start) => Ok(start(context)),

        (DialogueState::AwaitingReply { turn }, Event::LlmReply { content, tool_uses }) => {
            Ok(handle_reply(*turn, context, content.as_deref(), &tool_uses))
        }

        (
            DialogueState::ToolExecuting { turn, filename },
            Event::ToolComplete {
                filename: completed,
                output,
            },
        ) if *filename == completed => Ok(tool_finished(*turn, context, filename, output)),

        (DialogueState::AwaitingHuman { turn, question }, Event::HumanInput { text }) => {
            if text.trim() == EXIT_COMMAND {
                return Ok(TransitionResult::new(DialogueState::Aborted));
            }
            Ok(request_next(
                *turn,
                context,
                vec![
                    Effect::append_assistant(question.clone()),
                    Effect::append_user(text),
                ],
            ))
        }

        (DialogueState::AwaitingHuman { .. }, Event::InputClosed) => {
            Ok(TransitionResult::new(DialogueState::Aborted))
        }

        (state, event) => Err(TransitionError::InvalidTransition {
            state: state.name(),
            event: event.name(),
        }),
    }
}

fn start(context: &DialogueContext) -> TransitionResult {
    let file = &context.file;
    let mut effects = vec![
        Effect::Announce(Announcement::Checking {
            path: file.path.clone(),
        }),
        Effect::append_system(build_system_prompt(
            &context.merge_from,
            &context.merge_to,
        )),
        Effect::append_user(seed_message(&file.path, &file.original_content)),
    ];
    if !context.notes.is_empty() {
        effects.push(Effect::append_assistant(notes_message(&context.notes)));
    }

    TransitionResult::new(DialogueState::AwaitingReply { turn: 1 })
        .with_effects(effects)
        .with_effect(Effect::RequestLlm)
}

fn handle_reply(
    turn: u32,
    context: &DialogueContext,
    content: Option<&str>,
    tool_uses: &[ToolUse],
) -> TransitionResult {
    match classify(content, tool_uses) {
        ReplyKind::Resolution(text) => match fence::extract(text) {
            FenceMatch::Found { preamble, body } => TransitionResult::new(DialogueState::Resolved {
                content: body.to_string(),
            })
            .with_effect(Effect::Announce(Announcement::Resolution {
                preamble: preamble.to_string(),
            })),
            FenceMatch::NotFound => TransitionResult::new(DialogueState::MalformedResolution {
                reply: text.to_string(),
            }),
        },
        ReplyKind::ToolCall(tool_use) => dispatch_tool(turn, context, tool_use),
        ReplyKind::Empty => request_next(turn, context, vec![]),
        ReplyKind::Question(text) => TransitionResult::new(DialogueState::AwaitingHuman {
            turn,
            question: text.to_string(),
        })
        .with_effect(Effect::AskHuman {
            question: text.to_string(),
        }),
    }
}

fn dispatch_tool(turn: u32, context: &DialogueContext, tool_use: &ToolUse) -> TransitionResult {
    if tool_use.name != VIEW_FILE_CONTENTS {
        return request_next(
            turn,
            context,
            vec![Effect::append_assistant(format!(
                "ERROR: There is no tool named {}. Only {VIEW_FILE_CONTENTS} is available.",
                tool_use.name
            ))],
        );
    }

    let Some(filename) = tool_use.input.get("filename").and_then(Value::as_str) else {
        return request_next(
            turn,
            context,
            vec![Effect::append_assistant(format!(
                "ERROR: {VIEW_FILE_CONTENTS} needs a string \"filename\" argument."
            ))],
        );
    };

    if context.is_current_file(filename) {
        return request_next(
            turn,
            context,
            vec![Effect::append_assistant(SELF_VIEW_REJECTION)],
        );
    }

    TransitionResult::new(DialogueState::ToolExecuting {
        turn,
        filename: filename.to_string(),
    })
    .with_effect(Effect::ExecuteTool {
        name: tool_use.name.clone(),
        input: tool_use.input.clone(),
        filename: filename.to_string(),
    })
}

fn tool_finished(
    turn: u32,
    context: &DialogueContext,
    filename: &str,
    output: ToolOutput,
) -> TransitionResult {
    let effects = if output.success {
        vec![
            Effect::Announce(Announcement::Viewing {
                filename: filename.to_string(),
            }),
            Effect::append_assistant(format!("FILE: {filename}\n{}", fence::fence(&output.output))),
        ]
    } else {
        vec![Effect::append_assistant(format!(
            "ERROR: reading file {filename} - {}",
            output.output
        ))]
    };
    request_next(turn, context, effects)
}

/// Go back to the transport, unless the turn ceiling has been reached.
fn request_next(turn: u32, context: &DialogueContext, effects: Vec<Effect>) -> TransitionResult {
    if context.max_turns.is_some_and(|max| turn >= max) {
        return TransitionResult::new(DialogueState::Exhausted).with_effects(effects);
    }
    TransitionResult::new(DialogueState::AwaitingReply { turn: turn + 1 })
        .with_effects(effects)
        .with_effect(Effect::RequestLlm)
}
