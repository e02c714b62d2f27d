//! `view_file_contents` - lets the model read a sibling file before resolving
//!
//! Reads are confined to the repository: absolute paths and paths that climb
//! out through `..` are refused.

use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::path::{Component, Path};
use tokio::fs;

pub const VIEW_FILE_CONTENTS: &str = "view_file_contents";

pub struct ViewFileContentsTool;

#[derive(Debug, Deserialize)]
struct ViewFileInput {
    filename: String,
}

/// Components of `path` once `.` and `..` are resolved against the
/// repository root. `None` if the path is absolute or climbs above the root.
pub fn repo_relative_components(path: &Path) -> Option<Vec<&OsStr>> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts)
}

#[async_trait]
impl Tool for ViewFileContentsTool {
    fn name(&self) -> &'static str {
        VIEW_FILE_CONTENTS
    }

    fn description(&self) -> String {
        "If you have doubts about another file's contents, you can view it here.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["filename"],
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name of the file you want to view, relative to the repository root (the same directory the conflicted file path is relative to)."
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input: ViewFileInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        let relative = Path::new(&input.filename);
        if repo_relative_components(relative).is_none() {
            return ToolOutput::error(format!(
                "{} is outside the repository",
                input.filename
            ));
        }

        let path = ctx.working_dir.join(relative);
        match fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::debug!(path = %path.display(), bytes = content.len(), "Read file for model");
                ToolOutput::success(content)
            }
            Err(e) => ToolOutput::error(e.to_string()),
        }
    }
}
