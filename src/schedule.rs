//! Weekly unlock schedule.
//!
//! Riddle `k` opens exactly `k` weeks after the start date. Both functions are
//! pure: they take the current time as an argument and never read a clock.
//!
//! Week boundaries for `next_unlock_at` are computed with calendar-day
//! arithmetic in the start date's time zone, not by adding raw hours.

use chrono::{DateTime, Days, FixedOffset, TimeZone, Utc};

use crate::domain::RiddleSet;

const HOURS_PER_WEEK: i64 = 168;
const DAYS_PER_WEEK: u64 = 7;

/// Whole weeks elapsed since `start`, or `None` before the game starts.
fn weeks_passed<Tz: TimeZone>(now: &DateTime<Tz>, start: &DateTime<Tz>) -> Option<i64> {
  if now < start {
    return None;
  }
  let elapsed = now.clone().signed_duration_since(start.clone());
  Some(elapsed.num_hours() / HOURS_PER_WEEK)
}

/// Index of the latest riddle whose week has opened.
///
/// Returns `None` while `now < start` (game not started). Once every riddle has
/// been released the index stays on the last one.
pub fn unlocked_index<Tz: TimeZone>(now: &DateTime<Tz>, start: &DateTime<Tz>, riddle_count: usize) -> Option<usize> {
  let weeks = weeks_passed(now, start)?;
  let last = riddle_count.saturating_sub(1);
  Some(usize::try_from(weeks).map_or(last, |w| w.min(last)))
}

/// First `start + 7·k days` (k ≥ 0) strictly after `now`.
pub fn next_unlock_at<Tz: TimeZone>(now: &DateTime<Tz>, start: &DateTime<Tz>) -> DateTime<Tz> {
  let k = match weeks_passed(now, start) {
    None => return start.clone(),
    Some(w) => w as u64 + 1,
  };
  let mut next = shift_weeks(start, k);
  // A local calendar day may be shorter than 24h across a DST change.
  while next.as_ref().is_some_and(|n| n <= now) {
    next = next.and_then(|n| shift_weeks(&n, 1));
  }
  next.unwrap_or_else(|| end_of_time(start))
}

/// When riddle `index` opens: `start + 7·index days`.
pub fn unlock_at<Tz: TimeZone>(start: &DateTime<Tz>, index: usize) -> DateTime<Tz> {
  shift_weeks(start, index as u64).unwrap_or_else(|| end_of_time(start))
}

fn end_of_time<Tz: TimeZone>(start: &DateTime<Tz>) -> DateTime<Tz> {
  DateTime::<Utc>::MAX_UTC.with_timezone(&start.timezone())
}

fn shift_weeks<Tz: TimeZone>(from: &DateTime<Tz>, weeks: u64) -> Option<DateTime<Tz>> {
  from.clone().checked_add_days(Days::new(weeks.checked_mul(DAYS_PER_WEEK)?))
}

/// Schedule derived for one request. Computed fresh every time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleState<Tz: TimeZone> {
  pub now: DateTime<Tz>,
  pub unlocked_index: Option<usize>,
  pub next_unlock_at: DateTime<Tz>,
}

impl<Tz: TimeZone> ScheduleState<Tz> {
  pub fn derive(now: DateTime<Tz>, start: &DateTime<Tz>, riddle_count: usize) -> Self {
    let unlocked_index = unlocked_index(&now, start, riddle_count);
    let next_unlock_at = next_unlock_at(&now, start);
    Self { now, unlocked_index, next_unlock_at }
  }

  pub fn started(&self) -> bool { self.unlocked_index.is_some() }

  /// True once the last riddle's week has opened; no further unlock is pending.
  pub fn all_released(&self, riddle_count: usize) -> bool {
    self.unlocked_index.is_some_and(|i| i + 1 >= riddle_count)
  }
}

impl ScheduleState<FixedOffset> {
  /// Schedule for `now`, expressed in the riddle set's own time zone.
  pub fn for_set<Now: TimeZone>(now: &DateTime<Now>, set: &RiddleSet) -> Self {
    let start = set.start_date();
    Self::derive(now.with_timezone(start.offset()), &start, set.len())
  }
}
