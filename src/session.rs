//! Session driver: resolves every conflicted file in turn and carries merge
//! notes from one file's dialogue into the next

use crate::conflicts::{self, ConflictScan, ConflictedFile, LocatorError};
use crate::llm::LlmError;
use crate::notes::MergeNotes;
use crate::runtime::{rule, Console, DialogueError, DialogueRuntime, LlmClient, ToolExecutor};
use crate::state_machine::{DialogueContext, DialogueOutcome};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Settings shared by every file in a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub merge_from: String,
    pub merge_to: String,
    pub max_turns: Option<u32>,
    pub repo_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Resolved content was written back
    Updated,
    /// The human typed `exit` or closed input
    Skipped,
    /// The turn ceiling was reached before a resolution
    Exhausted,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
}

/// What happened to each file, in processing order
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub files: Vec<FileReport>,
}

impl SessionReport {
    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Updated))
    }

    /// Files left unresolved on disk without an error
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped | FileStatus::Exhausted))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} skipped, {} failed",
            self.updated(),
            self.skipped(),
            self.failed()
        )
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error("{path}: {source}")]
    Transport { path: String, source: LlmError },

    #[error("{path}: console I/O failed: {source}")]
    Console { path: String, source: io::Error },

    #[error("{path}: failed to write resolved file: {source}")]
    Write { path: String, source: io::Error },

    #[error("{path}: {source}")]
    Engine { path: String, source: DialogueError },
}

impl SessionError {
    fn from_dialogue(path: &str, error: DialogueError) -> Self {
        let path = path.to_string();
        match error {
            DialogueError::Transport(source) => SessionError::Transport { path, source },
            DialogueError::Console(source) => SessionError::Console { path, source },
            source => SessionError::Engine { path, source },
        }
    }
}

pub struct Session<L, T, C>
where
    L: LlmClient,
    T: ToolExecutor,
    C: Console,
{
    options: SessionOptions,
    notes: MergeNotes,
    llm_client: Arc<L>,
    tool_executor: Arc<T>,
    console: Arc<C>,
}

impl<L, T, C> Session<L, T, C>
where
    L: LlmClient,
    T: ToolExecutor,
    C: Console,
{
    pub fn new(
        options: SessionOptions,
        llm_client: Arc<L>,
        tool_executor: Arc<T>,
        console: Arc<C>,
    ) -> Self {
        Self {
            options,
            notes: MergeNotes::new(),
            llm_client,
            tool_executor,
            console,
        }
    }

    pub fn notes(&self) -> &MergeNotes {
        &self.notes
    }

    /// Find the conflicted files in the session's repository.
    pub fn locate(&self) -> Result<ConflictScan, SessionError> {
        Ok(conflicts::scan(&self.options.repo_root)?)
    }

    /// Resolve `files` one after another.
    ///
    /// A malformed resolution marks that file as failed and the session moves
    /// on. Transport, console and write failures stop the session.
    pub async fn run(&mut self, files: Vec<ConflictedFile>) -> Result<SessionReport, SessionError> {
        let mut report = SessionReport::default();
        for file in files {
            let status = self.resolve_file(&file).await?;
            tracing::info!(path = %file.path, status = ?status, "File finished");
            report.files.push(FileReport {
                path: file.path,
                status,
            });
        }
        tracing::info!(
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Session finished"
        );
        Ok(report)
    }

    async fn resolve_file(&mut self, file: &ConflictedFile) -> Result<FileStatus, SessionError> {
        if !self.notes.is_empty() {
            tracing::debug!(path = %file.path, notes_len = self.notes.as_str().len(), "Injecting merge notes");
        }
        let context = DialogueContext::new(
            file.clone(),
            &self.options.merge_from,
            &self.options.merge_to,
        )
        .with_notes(self.notes.as_str())
        .with_max_turns(self.options.max_turns);

        let mut runtime = DialogueRuntime::new(
            context,
            self.llm_client.clone(),
            self.tool_executor.clone(),
            self.console.clone(),
            self.options.repo_root.clone(),
        );
        let result = runtime.run().await;
        tracing::debug!(
            path = %file.path,
            state = runtime.state().name(),
            messages = runtime.conversation().len(),
            "Dialogue finished"
        );

        let added = self.notes.absorb(runtime.conversation());
        if added > 0 {
            tracing::debug!(path = %file.path, blocks = added, "Merge notes extended");
        }

        match result {
            Ok(DialogueOutcome::Resolved { content }) => {
                self.write_back(file, content).await?;
                self.console.show(&rule('-'));
                self.console.show(&format!("Updated: {}", file.path));
                Ok(FileStatus::Updated)
            }
            Ok(DialogueOutcome::Aborted) => {
                tracing::info!(path = %file.path, "Dialogue aborted by user");
                self.console.show(&rule('-'));
                self.console.show(&format!("Skipped: {}", file.path));
                Ok(FileStatus::Skipped)
            }
            Ok(DialogueOutcome::Exhausted) => {
                tracing::warn!(path = %file.path, max_turns = ?self.options.max_turns, "Turn limit reached");
                self.console.show(&rule('-'));
                self.console
                    .show(&format!("Skipped: {} (turn limit reached)", file.path));
                Ok(FileStatus::Exhausted)
            }
            Err(error @ DialogueError::MalformedResolution { .. }) => {
                self.console.show(&rule('-'));
                self.console.show(&format!("Failed: {}: {error}", file.path));
                Ok(FileStatus::Failed {
                    reason: error.to_string(),
                })
            }
            Err(error) => Err(SessionError::from_dialogue(&file.path, error)),
        }
    }

    async fn write_back(&self, file: &ConflictedFile, content: String) -> Result<(), SessionError> {
        let content = keep_trailing_newline(&file.original_content, content);
        let target = self.options.repo_root.join(&file.path);
        tokio::fs::write(&target, content)
            .await
            .map_err(|source| SessionError::Write {
                path: file.path.clone(),
                source,
            })
    }
}

/// Give `resolved` a final newline when the conflicted original had one.
fn keep_trailing_newline(original: &str, mut resolved: String) -> String {
    if original.ends_with('\n') && !resolved.ends_with('\n') {
        resolved.push('\n');
    }
    resolved
}
