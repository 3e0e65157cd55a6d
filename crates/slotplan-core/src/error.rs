//! Error types for planning operations.

use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Result type for planning operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised at the planner boundary.
///
/// Failing to find a placement is not an error: every planning operation has
/// an unconditional fallback. These variants only describe malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// An event ends before it starts.
    #[error("event '{title}' ends before it starts ({start} > {end})")]
    InvalidEvent {
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Working hours do not describe a non-empty window.
    #[error("working hours must start before they end ({start} >= {end})")]
    InvalidWorkingHours { start: NaiveTime, end: NaiveTime },

    /// A buffer or gap duration is negative.
    #[error("invalid {what}: {minutes} minutes")]
    InvalidDuration { what: &'static str, minutes: i64 },
}

impl PlanError {
    /// Creates an invalid duration error.
    pub fn invalid_duration(what: &'static str, duration: chrono::Duration) -> Self {
        Self::InvalidDuration {
            what,
            minutes: duration.num_minutes(),
        }
    }
}
