//! Application state shared by every request.
//!
//! Holds only immutable data: the riddle set loaded at startup and the clock
//! used to read "now". Handlers share it through an `Arc` without locking.

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::RiddleSet;
use crate::schedule::ScheduleState;

/// Source of the current time for request handling.
#[derive(Clone, Copy, Debug)]
pub enum Clock {
    System,
    /// Frozen time, for tests and previews.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub riddles: RiddleSet,
    pub clock: Clock,
}

impl AppState {
    pub fn new(riddles: RiddleSet) -> Self {
        Self { riddles, clock: Clock::System }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Read the clock once and derive this request's schedule.
    pub fn schedule(&self) -> ScheduleState<FixedOffset> {
        ScheduleState::for_set(&self.clock.now(), &self.riddles)
    }
}
