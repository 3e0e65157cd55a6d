//! Interval types for scheduling.
//!
//! This module provides [`TimeWindow`], a half-open `[start, end)` interval on
//! the local wall clock, the [`Slot`] alias used for free windows, and
//! [`WorkingHours`], the daily window within which meetings are preferred.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// A half-open interval `[start, end)` on the local wall clock.
///
/// An interval touching another exactly at a boundary is adjacent, not
/// overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: NaiveDateTime,
    /// End of the window (exclusive).
    pub end: NaiveDateTime,
}

/// A free (unbooked) window.
pub type Slot = TimeWindow;

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a time window from a start time and duration.
    pub fn from_duration(start: NaiveDateTime, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Creates a window covering a whole day, midnight to midnight.
    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_days(date, 1)
    }

    /// Creates a window covering `days` consecutive days starting at `date`.
    ///
    /// The end saturates at [`NaiveDateTime::MAX`].
    pub fn for_days(date: NaiveDate, days: u32) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDateTime::MAX);
        Self { start, end }
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the window covers no time at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Checks if an instant falls within this window.
    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if `[start, end)` shares any instant with this window.
    ///
    /// Empty intervals cover nothing and therefore never overlap.
    pub fn overlaps_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        intervals_overlap(self.start, self.end, start, end)
    }

    /// Checks if two windows share any instant.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.overlaps_range(other.start, other.end)
    }

    /// Returns the part of `[start, end)` that lies inside this window.
    pub fn clip(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<TimeWindow> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start < end).then_some(Self { start, end })
    }

    /// Returns true if an event of `duration` fits in this window.
    pub fn fits(&self, duration: Duration) -> bool {
        self.duration() >= duration
    }
}

/// Half-open overlap test shared by windows and events.
pub(crate) fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}

/// The daily window within which scheduling is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Time of day the working window opens.
    pub start: NaiveTime,
    /// Time of day the working window closes.
    pub end: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"),
        }
    }
}

impl WorkingHours {
    /// Creates working hours, rejecting empty or inverted windows.
    pub fn new(start: NaiveTime, end: NaiveTime) -> PlanResult<Self> {
        let hours = Self { start, end };
        hours.validate()?;
        Ok(hours)
    }

    /// Checks that the window opens before it closes.
    pub fn validate(&self) -> PlanResult<()> {
        if self.start >= self.end {
            return Err(PlanError::InvalidWorkingHours {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// The instant the window opens on `date`.
    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    /// The instant the window closes on `date`.
    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.end)
    }

    /// The working window anchored to `date`.
    pub fn window_on(&self, date: NaiveDate) -> TimeWindow {
        TimeWindow {
            start: self.start_on(date),
            end: self.end_on(date),
        }
    }
}
