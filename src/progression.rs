//! Answer progression state machine.
//!
//! A visitor's cursor moves through the riddle list one correct answer at a
//! time, but never past the latest riddle the schedule has opened. Nothing is
//! stored: every submission is decided from the riddle set, the current unlock
//! ceiling and the submitted text alone.

use crate::domain::{AnswerSubmission, RiddleSet};
use crate::error::ProgressionError;

/// Where a visitor stands in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
  NotStarted,
  Viewing(usize),
  Completed,
}

/// Result of one answer submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
  /// The game has not started; nothing can be answered yet.
  NotStarted,
  /// The riddle exists but its week has not opened.
  Locked(usize),
  /// The riddle has no expected answer to check against.
  Misconfigured(usize),
  /// Wrong answer; the cursor stays on this riddle.
  Rejected(usize),
  /// Correct answer; cursor moves to this index, capped by the unlock ceiling.
  Advanced(usize),
  /// Correct answer on the last riddle.
  Completed,
}

impl Outcome {
  /// Cursor position after this outcome.
  pub fn progress(self) -> Progress {
    match self {
      Outcome::NotStarted => Progress::NotStarted,
      Outcome::Locked(i) | Outcome::Misconfigured(i) | Outcome::Rejected(i) | Outcome::Advanced(i) => Progress::Viewing(i),
      Outcome::Completed => Progress::Completed,
    }
  }
}

/// Trim surrounding whitespace and lower-case, so free-text answers compare
/// regardless of case or stray spaces.
pub fn normalize_answer(raw: &str) -> String {
  raw.trim().to_lowercase()
}

/// Validate a path index against the riddle set.
pub fn check_index(set: &RiddleSet, index: i64) -> Result<usize, ProgressionError> {
  usize::try_from(index)
    .ok()
    .filter(|&i| i < set.len())
    .ok_or(ProgressionError::OutOfRange { index, count: set.len() })
}

/// Whether riddle `index` may be shown under the current unlock ceiling.
pub fn is_visible(index: usize, unlocked: Option<usize>) -> bool {
  unlocked.is_some_and(|ceiling| index <= ceiling)
}

/// Decide a submission. `unlocked` is the schedule's current ceiling
/// (`None` before the start date).
pub fn submit_answer(set: &RiddleSet, unlocked: Option<usize>, submission: &AnswerSubmission) -> Result<Outcome, ProgressionError> {
  let index = check_index(set, submission.riddle_index)?;
  let Some(ceiling) = unlocked else {
    return Ok(Outcome::NotStarted);
  };
  if index > ceiling {
    return Ok(Outcome::Locked(index));
  }

  let Some(expected) = set.get(index).and_then(|r| r.expected()) else {
    return Ok(Outcome::Misconfigured(index));
  };
  if normalize_answer(&submission.raw_answer) != normalize_answer(expected) {
    return Ok(Outcome::Rejected(index));
  }

  if index >= set.last_index() {
    Ok(Outcome::Completed)
  } else {
    Ok(Outcome::Advanced((index + 1).min(ceiling)))
  }
}
