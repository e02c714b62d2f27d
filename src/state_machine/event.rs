//! Events that drive a dialogue forward

use crate::llm::ToolUse;
use crate::tools::ToolOutput;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Begin the dialogue
    Start,

    // Transport events
    LlmReply {
        content: Option<String>,
        tool_uses: Vec<ToolUse>,
    },

    // Tool events
    ToolComplete {
        filename: String,
        output: ToolOutput,
    },

    // Console events
    HumanInput {
        text: String,
    },
    /// Console input reached end of file
    InputClosed,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::LlmReply { .. } => "llm_reply",
            Event::ToolComplete { .. } => "tool_complete",
            Event::HumanInput { .. } => "human_input",
            Event::InputClosed => "input_closed",
        }
    }
}
