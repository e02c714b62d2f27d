//! Command-line surface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Git conflict utilities backed by a chat model.
#[derive(Parser, Debug)]
#[command(name = "gcu", version, about = "Resolve git merge conflicts with an LLM")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every conflicted file in the repository, one at a time.
    MergeConflicts(MergeConflictsArgs),

    /// List the available utilities.
    List,
}

#[derive(Args, Debug, Clone)]
pub struct MergeConflictsArgs {
    /// Branch being merged from.
    #[arg(long, default_value = "branch-A")]
    pub merge_from: String,

    /// Branch being merged into.
    #[arg(long, default_value = "branch-B")]
    pub merge_to: String,

    /// Chat model to use (overrides GCU_MODEL).
    #[arg(long)]
    pub model: Option<String>,

    /// Stop a file's dialogue after this many model calls (overrides GCU_MAX_TURNS).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_turns: Option<u32>,

    /// Repository root.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}
