//! Request boundary between the HTTP handlers and the game core.
//!
//! Each function reads the clock once, derives the schedule, runs the
//! progression engine if needed and returns a `Page` for the renderer. Nothing
//! here produces markup.

use chrono::{DateTime, FixedOffset, TimeDelta};
use tracing::{debug, info, instrument};

use crate::domain::AnswerSubmission;
use crate::error::{ProgressionError, RequestError};
use crate::progression::{check_index, is_visible, submit_answer, Outcome};
use crate::schedule::{unlock_at, ScheduleState};
use crate::state::AppState;

/// Time left until the next unlock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
  pub at: DateTime<FixedOffset>,
  pub remaining: TimeDelta,
}

impl Countdown {
  fn next_unlock(schedule: &ScheduleState<FixedOffset>) -> Self {
    Self {
      at: schedule.next_unlock_at,
      remaining: schedule.next_unlock_at.signed_duration_since(schedule.now),
    }
  }

  /// Countdown to the week riddle `index` opens.
  fn opening_of(schedule: &ScheduleState<FixedOffset>, start: &DateTime<FixedOffset>, index: usize) -> Self {
    let at = unlock_at(start, index);
    Self { at, remaining: at.signed_duration_since(schedule.now) }
  }

  /// Countdown to the next riddle, or `None` once every riddle is out.
  fn pending(schedule: &ScheduleState<FixedOffset>, riddle_count: usize) -> Option<Self> {
    (!schedule.all_released(riddle_count)).then(|| Self::next_unlock(schedule))
  }
}

/// Notice shown above a riddle after a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMessage {
  WrongAnswer,
  NoAnswerConfigured,
  /// Correct, but the next riddle's week has not opened.
  SolvedWaiting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiddleView {
  pub index: usize,
  pub title: String,
  pub body: String,
  pub countdown: Option<Countdown>,
  pub message: Option<ProgressMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HomeStatus {
  NotStarted(Countdown),
  Open { current: usize, countdown: Option<Countdown> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
  Home(HomeStatus),
  Riddle(RiddleView),
  /// Riddle exists but is not visible yet (`index` is `None` before the game starts).
  Locked { index: Option<usize>, countdown: Countdown },
  End,
}

fn parse_id(raw: &str) -> Result<i64, RequestError> {
  raw.trim().parse::<i64>().map_err(|_| RequestError::InvalidId(raw.to_string()))
}

fn riddle_view(
  state: &AppState,
  index: usize,
  countdown: Option<Countdown>,
  message: Option<ProgressMessage>,
) -> Result<Page, RequestError> {
  let r = state.riddles.get(index).ok_or(ProgressionError::OutOfRange {
    index: index as i64,
    count: state.riddles.len(),
  })?;
  Ok(Page::Riddle(RiddleView { index, title: r.title.clone(), body: r.body.clone(), countdown, message }))
}

fn locked(state: &AppState, schedule: &ScheduleState<FixedOffset>, index: usize) -> Page {
  match schedule.unlocked_index {
    None => Page::Locked { index: None, countdown: Countdown::next_unlock(schedule) },
    Some(_) => Page::Locked { index: Some(index), countdown: Countdown::opening_of(schedule, &state.riddles.start_date(), index) },
  }
}

#[instrument(level = "info", skip(state))]
pub fn home_page(state: &AppState) -> Page {
  let schedule = state.schedule();
  let status = match schedule.unlocked_index {
    None => {
      debug!(target: "riddle", start = %state.riddles.start_date(), "The game has not started yet");
      HomeStatus::NotStarted(Countdown::next_unlock(&schedule))
    }
    Some(current) => HomeStatus::Open { current, countdown: Countdown::pending(&schedule, state.riddles.len()) },
  };
  Page::Home(status)
}

#[instrument(level = "info", skip(state))]
pub fn riddle_page(state: &AppState, raw_id: &str) -> Result<Page, RequestError> {
  let index = check_index(&state.riddles, parse_id(raw_id)?)?;
  let schedule = state.schedule();
  if !is_visible(index, schedule.unlocked_index) {
    debug!(target: "riddle", index, unlocked = ?schedule.unlocked_index, "Riddle still locked");
    return Ok(locked(state, &schedule, index));
  }
  riddle_view(state, index, Countdown::pending(&schedule, state.riddles.len()), None)
}

#[instrument(level = "info", skip(state, answer), fields(answer_len = answer.len()))]
pub fn answer_page(state: &AppState, raw_id: &str, answer: &str) -> Result<Page, RequestError> {
  let submission = AnswerSubmission { riddle_index: parse_id(raw_id)?, raw_answer: answer.to_string() };
  let schedule = state.schedule();
  let outcome = submit_answer(&state.riddles, schedule.unlocked_index, &submission)?;
  info!(target: "riddle", index = submission.riddle_index, ?outcome, progress = ?outcome.progress(), "Answer evaluated");

  let pending = Countdown::pending(&schedule, state.riddles.len());
  match outcome {
    Outcome::NotStarted => Ok(Page::Locked { index: None, countdown: Countdown::next_unlock(&schedule) }),
    Outcome::Locked(i) => Ok(locked(state, &schedule, i)),
    Outcome::Misconfigured(i) => riddle_view(state, i, pending, Some(ProgressMessage::NoAnswerConfigured)),
    Outcome::Rejected(i) => riddle_view(state, i, pending, Some(ProgressMessage::WrongAnswer)),
    Outcome::Advanced(next) if next as i64 == submission.riddle_index => {
      riddle_view(state, next, pending, Some(ProgressMessage::SolvedWaiting))
    }
    Outcome::Advanced(next) => riddle_view(state, next, pending, None),
    Outcome::Completed => Ok(Page::End),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Riddle, RiddleSet};
  use crate::state::Clock;
  use chrono::{TimeZone, Utc};

  fn state_at(day: u32, hour: u32) -> AppState {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset();
    let riddles = vec![
      Riddle { title: "Un".into(), body: "Rusé".into(), expected_answer: Some("Renard".into()) },
      Riddle { title: "Deux".into(), body: "Sans réponse".into(), expected_answer: None },
      Riddle { title: "Trois".into(), body: "Nocturne".into(), expected_answer: Some("hibou".into()) },
    ];
    let now = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
    AppState::new(RiddleSet::new(start, riddles).unwrap()).with_clock(Clock::Fixed(now))
  }

  fn riddle(page: Page) -> RiddleView {
    match page {
      Page::Riddle(v) => v,
      other => panic!("expected riddle page, got {other:?}"),
    }
  }

  #[test]
  fn home_counts_down_before_start() {
    let mut s = state_at(1, 0);
    s.clock = Clock::Fixed(Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap());
    match home_page(&s) {
      Page::Home(HomeStatus::NotStarted(c)) => assert_eq!(c.remaining, TimeDelta::hours(12)),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn home_points_at_current_riddle() {
    match home_page(&state_at(9, 0)) {
      Page::Home(HomeStatus::Open { current, countdown }) => {
        assert_eq!(current, 1);
        assert_eq!(countdown.unwrap().remaining, TimeDelta::days(6));
      }
      other => panic!("unexpected {other:?}"),
    }
    match home_page(&state_at(30, 0)) {
      Page::Home(HomeStatus::Open { current, countdown }) => {
        assert_eq!(current, 2);
        assert!(countdown.is_none());
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn riddle_page_checks_id_and_window() {
    let s = state_at(2, 0);
    assert_eq!(riddle_page(&s, "x"), Err(RequestError::InvalidId("x".into())));
    assert_eq!(
      riddle_page(&s, "3"),
      Err(RequestError::Progression(ProgressionError::OutOfRange { index: 3, count: 3 }))
    );
    assert!(matches!(riddle_page(&s, "1"), Ok(Page::Locked { index: Some(1), .. })));
    let v = riddle(riddle_page(&s, "0").unwrap());
    assert_eq!(v.title, "Un");
    assert!(v.countdown.is_some());
  }

  #[test]
  fn locked_riddle_counts_down_to_its_own_week() {
    let s = state_at(2, 0);
    match riddle_page(&s, "2").unwrap() {
      Page::Locked { index: Some(2), countdown } => {
        assert_eq!(countdown.at, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(countdown.remaining, TimeDelta::days(13));
      }
      other => panic!("unexpected {other:?}"),
    }
    match answer_page(&s, "2", "hibou").unwrap() {
      Page::Locked { index: Some(2), countdown } => assert_eq!(countdown.remaining, TimeDelta::days(13)),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn riddle_view_refuses_unknown_index() {
    let s = state_at(30, 0);
    assert_eq!(
      riddle_view(&s, 3, None, None),
      Err(RequestError::Progression(ProgressionError::OutOfRange { index: 3, count: 3 }))
    );
  }

  #[test]
  fn answers_drive_pages() {
    let s = state_at(16, 0);
    assert_eq!(riddle(answer_page(&s, "0", "loup").unwrap()).message, Some(ProgressMessage::WrongAnswer));
    assert_eq!(riddle(answer_page(&s, "0", " RENARD ").unwrap()).index, 1);
    assert_eq!(riddle(answer_page(&s, "1", "x").unwrap()).message, Some(ProgressMessage::NoAnswerConfigured));
    assert_eq!(answer_page(&s, "2", "Hibou"), Ok(Page::End));
  }

  #[test]
  fn correct_answer_waits_for_next_week() {
    let v = riddle(answer_page(&state_at(3, 0), "0", "renard").unwrap());
    assert_eq!(v.index, 0);
    assert_eq!(v.message, Some(ProgressMessage::SolvedWaiting));
    assert_eq!(v.countdown.unwrap().remaining, TimeDelta::days(5));
  }

  #[test]
  fn answer_before_start_is_locked() {
    let mut s = state_at(1, 0);
    s.clock = Clock::Fixed(Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    assert!(matches!(answer_page(&s, "0", "renard"), Ok(Page::Locked { index: None, .. })));
  }
}
