//! Runtime configuration from the environment, with command-line overrides

use crate::llm::DEFAULT_BASE_URL;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Transport settings for a session
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Ceiling on transport calls per file; unbounded when `None`
    pub max_turns: Option<u32>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let max_turns = match get("GCU_MAX_TURNS") {
            Some(value) => Some(parse_turns("GCU_MAX_TURNS", &value)?),
            None => None,
        };

        Ok(Self {
            api_key,
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("GCU_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_turns,
        })
    }

    /// Apply command-line values, which win over the environment.
    #[must_use]
    pub fn with_overrides(mut self, model: Option<String>, max_turns: Option<u32>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if max_turns.is_some() {
            self.max_turns = max_turns;
        }
        self
    }
}

/// Load a `.env` file from the working directory or one of its parents into
/// the process environment. Variables that are already set keep their value.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    }
}

fn parse_turns(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
