//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::llm::{LlmError, LlmRequest, LlmResponse, ToolDefinition};
use crate::tools::{ToolContext, ToolOutput, ToolRegistry, VIEW_FILE_CONTENTS};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain text reply
    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue_response(LlmResponse::text(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock `view_file_contents` backed by an in-memory file table.
///
/// A file registered several times serves its versions in order, one per
/// read, and keeps serving the last one.
pub struct MockToolExecutor {
    files: Mutex<HashMap<String, VecDeque<String>>>,
    /// Record of tool executions
    pub executions: Mutex<Vec<(String, Value)>>,
}

#[allow(dead_code)]
impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Make `filename` readable with `content`, after any earlier versions
    pub fn with_file(self, filename: impl Into<String>, content: impl Into<String>) -> Self {
        self.files
            .lock()
            .unwrap()
            .entry(filename.into())
            .or_default()
            .push_back(content.into());
        self
    }

    /// Get recorded executions
    pub fn recorded_executions(&self) -> Vec<(String, Value)> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for MockToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, name: &str, input: Value, _ctx: ToolContext) -> Option<ToolOutput> {
        self.executions
            .lock()
            .unwrap()
            .push((name.to_string(), input.clone()));
        if name != VIEW_FILE_CONTENTS {
            return None;
        }
        let filename = input.get("filename").and_then(Value::as_str).unwrap_or("");
        let mut files = self.files.lock().unwrap();
        let content = files.get_mut(filename).and_then(|versions| {
            if versions.len() > 1 {
                versions.pop_front()
            } else {
                versions.front().cloned()
            }
        });
        Some(match content {
            Some(content) => ToolOutput::success(content),
            None => ToolOutput::error("No such file or directory (os error 2)"),
        })
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        ToolRegistry::standard().definitions()
    }
}

// ============================================================================
// Scripted Console
// ============================================================================

/// Console that replays queued input lines and records everything shown
pub struct ScriptedConsole {
    input: Mutex<VecDeque<String>>,
    /// Every block passed to `show`, in order
    pub shown: Mutex<Vec<String>>,
    /// Every prompt passed to `read_line`, in order
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedConsole {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(VecDeque::new()),
            shown: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Console that answers with `lines` in order, then reports end of input
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::new();
        console
            .input
            .lock()
            .unwrap()
            .extend(lines.into_iter().map(Into::into));
        console
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    /// Everything shown, joined with newlines as a terminal would print it
    pub fn transcript(&self) -> String {
        self.shown().join("\n")
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for ScriptedConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn show(&self, text: &str) {
        self.shown.lock().unwrap().push(text.to_string());
    }

    async fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.input.lock().unwrap().pop_front())
    }
}
