//! Dialogue runtime executor

use super::console::rule;
use super::traits::{Console, LlmClient, ToolExecutor};
use crate::llm::{LlmError, LlmRequest};
use crate::state_machine::{
    transition, Conversation, DialogueContext, DialogueOutcome, DialogueState, Effect, Event,
    TransitionError,
};
use crate::tools::{ToolContext, ToolOutput};
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Sampling temperature for every reply
pub const REPLY_TEMPERATURE: f32 = 0.4;

/// Output token ceiling for every reply
pub const MAX_REPLY_TOKENS: u32 = 4096;

const HUMAN_PROMPT: &str = "> ";

/// Ways a dialogue can fail to reach an outcome
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("assistant transport failed: {0}")]
    Transport(#[from] LlmError),

    #[error("reply announced a resolution but contained no fenced file")]
    MalformedResolution { reply: String },

    #[error("console I/O failed: {0}")]
    Console(#[from] io::Error),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("dialogue stopped in non-terminal state {state}")]
    Stalled { state: &'static str },
}

/// Runs one file's dialogue: feeds events into `transition` and executes the
/// effects it returns until a terminal state is reached
pub struct DialogueRuntime<L, T, C>
where
    L: LlmClient,
    T: ToolExecutor,
    C: Console,
{
    context: DialogueContext,
    state: DialogueState,
    conversation: Conversation,
    llm_client: Arc<L>,
    tool_executor: Arc<T>,
    console: Arc<C>,
    tool_context: ToolContext,
}

impl<L, T, C> DialogueRuntime<L, T, C>
where
    L: LlmClient,
    T: ToolExecutor,
    C: Console,
{
    pub fn new(
        context: DialogueContext,
        llm_client: Arc<L>,
        tool_executor: Arc<T>,
        console: Arc<C>,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            context,
            state: DialogueState::Init,
            conversation: Conversation::new(),
            llm_client,
            tool_executor,
            console,
            tool_context: ToolContext::new(working_dir),
        }
    }

    /// Messages exchanged so far. Still meaningful after `run` fails.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<DialogueOutcome, DialogueError> {
        tracing::debug!(path = %self.context.file.path, "Starting dialogue");

        let mut pending = VecDeque::from([Event::Start]);
        while let Some(event) = pending.pop_front() {
            let event_name = event.name();
            let result = transition(&self.state, &self.context, event)?;
            tracing::debug!(
                path = %self.context.file.path,
                event = event_name,
                from = self.state.name(),
                to = result.new_state.name(),
                "Transition"
            );
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect).await? {
                    pending.push_back(next);
                }
            }
        }

        if !self.state.is_terminal() {
            return Err(DialogueError::Stalled {
                state: self.state.name(),
            });
        }
        match &self.state {
            DialogueState::MalformedResolution { reply } => {
                tracing::warn!(path = %self.context.file.path, "Resolution reply had no fenced file");
                Err(DialogueError::MalformedResolution {
                    reply: reply.clone(),
                })
            }
            state => state
                .outcome()
                .ok_or(DialogueError::Stalled { state: state.name() }),
        }
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, DialogueError> {
        match effect {
            Effect::AppendMessage { message } => {
                self.conversation.push(message);
                Ok(None)
            }

            Effect::RequestLlm => {
                let request = LlmRequest {
                    messages: self.conversation.messages().to_vec(),
                    tools: self.tool_executor.definitions(),
                    max_tokens: Some(MAX_REPLY_TOKENS),
                    temperature: Some(REPLY_TEMPERATURE),
                };
                tracing::debug!(
                    model = self.llm_client.model_id(),
                    messages = request.messages.len(),
                    "Requesting reply"
                );
                let response = self.llm_client.complete(&request).await?;
                if response.tool_uses.len() > 1 {
                    tracing::info!(
                        count = response.tool_uses.len(),
                        "Reply requested several tool calls; only the first is honoured"
                    );
                }
                Ok(Some(Event::LlmReply {
                    content: response.content,
                    tool_uses: response.tool_uses,
                }))
            }

            Effect::ExecuteTool {
                name,
                input,
                filename,
            } => {
                let output = self
                    .tool_executor
                    .execute(&name, input, self.tool_context.clone())
                    .await
                    .unwrap_or_else(|| ToolOutput::error(format!("Unknown tool: {name}")));
                tracing::debug!(tool = %name, %filename, success = output.success, "Tool executed");
                Ok(Some(Event::ToolComplete { filename, output }))
            }

            Effect::AskHuman { question } => {
                self.console.show(&rule('='));
                self.console.show(&question);
                match self.console.read_line(HUMAN_PROMPT).await? {
                    Some(text) => Ok(Some(Event::HumanInput { text })),
                    None => {
                        tracing::debug!(path = %self.context.file.path, "Console input closed");
                        Ok(Some(Event::InputClosed))
                    }
                }
            }

            Effect::Announce(announcement) => {
                self.console.show(&rule('-'));
                self.console.show(&announcement.to_string());
                Ok(None)
            }
        }
    }
}
