//! Domain models: riddles, the immutable riddle set, and answer submissions.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::ConfigError;

/// One riddle as written in the riddles document.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Riddle {
  pub title: String,
  #[serde(rename = "text")]
  pub body: String,
  /// Empty or absent: no verification configured for this riddle.
  #[serde(default, rename = "answer")]
  pub expected_answer: Option<String>,
}

impl Riddle {
  /// Expected answer, treating a blank string the same as a missing one.
  pub fn expected(&self) -> Option<&str> {
    self.expected_answer.as_deref().filter(|a| !a.trim().is_empty())
  }
}

/// Raw document shape; validated into a `RiddleSet` before use.
#[derive(Debug, Deserialize)]
struct RiddleDoc {
  start_date: DateTime<FixedOffset>,
  riddles: Vec<Riddle>,
}

/// The game content, loaded once at startup and never mutated.
/// Always holds at least one riddle.
#[derive(Clone, Debug)]
pub struct RiddleSet {
  start_date: DateTime<FixedOffset>,
  riddles: Vec<Riddle>,
}

impl RiddleSet {
  pub fn new(start_date: DateTime<FixedOffset>, riddles: Vec<Riddle>) -> Result<Self, ConfigError> {
    if riddles.is_empty() {
      return Err(ConfigError::EmptyRiddles);
    }
    Ok(Self { start_date, riddles })
  }

  pub fn from_json(s: &str) -> Result<Self, ConfigError> {
    let doc: RiddleDoc = serde_json::from_str(s)?;
    Self::new(doc.start_date, doc.riddles)
  }

  pub fn start_date(&self) -> DateTime<FixedOffset> { self.start_date }

  pub fn len(&self) -> usize { self.riddles.len() }

  pub fn last_index(&self) -> usize { self.riddles.len() - 1 }

  pub fn get(&self, index: usize) -> Option<&Riddle> { self.riddles.get(index) }
}

/// A visitor's answer for one riddle. Lives for a single request.
#[derive(Clone, Debug)]
pub struct AnswerSubmission {
  pub riddle_index: i64,
  pub raw_answer: String,
}
