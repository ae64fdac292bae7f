//! Public request/response structs for the HTTP endpoints (serde ready).

use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleState;
use chrono::FixedOffset;

/// Form body of `POST /riddles/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// JSON view of the current schedule.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleOut {
    pub started: bool,
    pub unlocked_index: Option<usize>,
    pub next_unlock_at: String,
    pub riddle_count: usize,
    pub now: String,
}

pub fn to_schedule_out(s: &ScheduleState<FixedOffset>, riddle_count: usize) -> ScheduleOut {
    ScheduleOut {
        started: s.started(),
        unlocked_index: s.unlocked_index,
        next_unlock_at: s.next_unlock_at.to_rfc3339(),
        riddle_count,
        now: s.now.to_rfc3339(),
    }
}
