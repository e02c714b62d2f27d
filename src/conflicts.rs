//! Conflict locator: files the index still holds in conflict after a merge

use git2::Repository;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file with unresolved merge markers, as found at session start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    /// Path relative to the repository root
    pub path: String,
    pub original_content: String,
}

impl ConflictedFile {
    pub fn new(path: impl Into<String>, original_content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_content: original_content.into(),
        }
    }
}

/// A conflicted path whose working-tree copy could not be read
#[derive(Debug)]
pub struct UnreadableFile {
    pub path: String,
    pub error: io::Error,
}

/// Everything the locator found
#[derive(Debug, Default)]
pub struct ConflictScan {
    pub files: Vec<ConflictedFile>,
    pub unreadable: Vec<UnreadableFile>,
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("{0} is not a git repository; this command must be run inside one")]
    NotARepository(String),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Paths with conflict entries in the index, sorted and de-duplicated.
pub fn conflicted_paths(repo: &Repository) -> Result<Vec<String>, git2::Error> {
    let index = repo.index()?;
    let mut paths = BTreeSet::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        // A side is missing when one branch deleted the file
        let entry = conflict
            .our
            .as_ref()
            .or(conflict.their.as_ref())
            .or(conflict.ancestor.as_ref());
        if let Some(entry) = entry {
            paths.insert(String::from_utf8_lossy(&entry.path).into_owned());
        }
    }
    Ok(paths.into_iter().collect())
}

/// Open the repository at `repo_root` and read every conflicted file.
pub fn scan(repo_root: &Path) -> Result<ConflictScan, LocatorError> {
    let repo = Repository::open(repo_root)
        .map_err(|_| LocatorError::NotARepository(repo_root.display().to_string()))?;
    let workdir: PathBuf = repo
        .workdir()
        .ok_or_else(|| LocatorError::NotARepository(repo_root.display().to_string()))?
        .to_path_buf();

    let mut scan = ConflictScan::default();
    for path in conflicted_paths(&repo)? {
        match std::fs::read_to_string(workdir.join(&path)) {
            Ok(content) => scan.files.push(ConflictedFile::new(path, content)),
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "Skipping unreadable conflicted file");
                scan.unreadable.push(UnreadableFile { path, error });
            }
        }
    }

    tracing::debug!(
        conflicted = scan.files.len(),
        unreadable = scan.unreadable.len(),
        "Scanned index for conflicts"
    );
    Ok(scan)
}
