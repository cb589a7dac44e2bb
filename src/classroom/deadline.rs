use chrono::{DateTime, Utc};

use crate::github::StatusState;

/// Whether something done at `instant` made it before the deadline.
///
/// Assignments without a due date never fail, and the deadline itself still counts as on time.
pub fn evaluate(instant: DateTime<Utc>, due_date: Option<DateTime<Utc>>) -> StatusState {
    match due_date {
        Some(due_date) if instant > due_date => StatusState::Failure,
        _ => StatusState::Success,
    }
}
