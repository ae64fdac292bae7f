//! Server settings from the environment and the riddles document loader.
//!
//! The riddles file is JSON:
//! `{ "start_date": "<RFC 3339>", "riddles": [ { "title", "text", "answer"? } ] }`

use std::{path::Path, str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::domain::RiddleSet;
use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_RIDDLES_PATH: &str = "./riddles.json";
const DEFAULT_ASSETS_DIR: &str = "./assets";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
  pub port: u16,
  pub riddles_path: String,
  pub assets_dir: String,
  pub request_timeout: Duration,
  pub shutdown_timeout: Duration,
  /// Frozen "now" for previewing the game at another date.
  pub preview_now: Option<DateTime<Utc>>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      riddles_path: DEFAULT_RIDDLES_PATH.into(),
      assets_dir: DEFAULT_ASSETS_DIR.into(),
      request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
      shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
      preview_now: None,
    }
  }
}

impl ServerConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build settings from any key lookup; unparseable numbers keep their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let d = Self::default();
    Self {
      port: parse_or("PORT", lookup("PORT"), d.port),
      riddles_path: lookup("RIDDLES_PATH").unwrap_or(d.riddles_path),
      assets_dir: lookup("ASSETS_DIR").unwrap_or(d.assets_dir),
      request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", lookup("REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS)),
      shutdown_timeout: Duration::from_secs(parse_or("SHUTDOWN_TIMEOUT_SECS", lookup("SHUTDOWN_TIMEOUT_SECS"), DEFAULT_SHUTDOWN_TIMEOUT_SECS)),
      preview_now: lookup("PREVIEW_NOW").and_then(|v| parse_preview(&v)),
    }
  }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
  match raw {
    None => default,
    Some(v) => v.trim().parse().unwrap_or_else(|_| {
      warn!(target: "mysterybox", key, value = %v, %default, "Invalid value; using default");
      default
    }),
  }
}

fn parse_preview(raw: &str) -> Option<DateTime<Utc>> {
  match DateTime::parse_from_rfc3339(raw.trim()) {
    Ok(at) => Some(at.with_timezone(&Utc)),
    Err(e) => {
      warn!(target: "mysterybox", value = raw, error = %e, "Invalid PREVIEW_NOW; using the system clock");
      None
    }
  }
}

/// Read and validate the riddles document. Any failure is fatal for startup.
pub fn load_riddle_set(path: impl AsRef<Path>) -> Result<RiddleSet, ConfigError> {
  let path = path.as_ref();
  let raw = std::fs::read_to_string(path).map_err(|source| {
    let path = path.display().to_string();
    error!(target: "mysterybox", %path, error = %source, "Failed to read riddles file");
    ConfigError::Io { path, source }
  })?;

  let set = RiddleSet::from_json(&raw).map_err(|e| {
    error!(target: "mysterybox", path = %path.display(), error = %e, "Invalid riddles file");
    e
  })?;
  info!(
    target: "mysterybox",
    path = %path.display(),
    riddles = set.len(),
    start_date = %set.start_date().to_rfc3339(),
    "Loaded riddles"
  );
  Ok(set)
}
