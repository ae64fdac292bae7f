//! Error types for riddle loading and answer progression.

use thiserror::Error;

/// Fatal startup errors: the server must not run without a valid riddle set.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read riddles file '{path}': {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse riddles JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("Riddle list is empty")]
  EmptyRiddles,
}

/// Errors raised by the progression engine for invalid input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionError {
  #[error("Riddle {index} does not exist (game has {count} riddles)")]
  OutOfRange { index: i64, count: usize },
}

/// Request-level failures surfaced to the HTTP boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
  #[error("Invalid riddle id '{0}'")]
  InvalidId(String),

  #[error(transparent)]
  Progression(#[from] ProgressionError),
}
