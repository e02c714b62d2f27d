//! Tools the model may invoke while resolving a conflicted file
//!
//! There is exactly one: `view_file_contents`, a read-only window onto the
//! repository being merged.

mod view_file;

pub use view_file::{repo_relative_components, ViewFileContentsTool, VIEW_FILE_CONTENTS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::llm::ToolDefinition;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// All context needed for a tool invocation.
///
/// Created fresh for each tool call. Tools are stateless and derive all
/// context from this struct.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Repository root; relative filenames resolve against it
    pub working_dir: PathBuf,
}

impl ToolContext {
    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }
}

/// Trait for tools that can be executed by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool with all context provided via `ToolContext`
    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Collection of tools offered to the model
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// The tool set used for conflict resolution
    pub fn standard() -> Self {
        Self {
            tools: vec![Arc::new(ViewFileContentsTool)],
        }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name with context
    pub async fn execute(&self, name: &str, input: Value, ctx: ToolContext) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                return Some(tool.run(input, ctx).await);
            }
        }
        None
    }
}
