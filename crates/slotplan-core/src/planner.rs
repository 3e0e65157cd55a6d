//! Placement of new and conflicting meetings.
//!
//! The planner is an ordered greedy heuristic, not a solver. Meetings are
//! placed one at a time in start order and every placement is final: a
//! meeting placed earlier in an attempt becomes an obstacle for the meetings
//! after it, and nothing is ever moved back.
//!
//! # Rescheduling cascade
//!
//! [`Planner::suggest_reschedules`] runs the same greedy pass under
//! increasingly permissive settings and returns the first that places every
//! meeting:
//!
//! 1. [`Strategy::Buffered`]: from the smart start, with the buffer
//! 2. [`Strategy::Compact`]: from the smart start, without buffer
//! 3. [`Strategy::CompactFromDayStart`]: from the start of working hours,
//!    without buffer (only when the smart start is later)
//! 4. [`Strategy::Forced`]: stack meetings after the latest obstacle,
//!    ignoring the end of working hours; always succeeds
//!
//! The smart start is the later of the working-hours start and the earliest
//! conflicting meeting, so planning never rewinds a morning that was not in
//! conflict.
//!
//! # Known weak spots
//!
//! - The gap before the first obstacle ignores the buffer.
//! - The trailing gap starts after the last obstacle in start order, which is
//!   not necessarily the one ending last.
//! - A forced placement may run past the end of the day.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::event::Event;
use crate::freeslots::find_free_slots;
use crate::overlap::{Overlap, find_overlaps};
use crate::time::Slot;

/// One configuration of the greedy placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Start at the smart start, keep the requested buffer.
    Buffered,
    /// Start at the smart start, no buffer.
    Compact,
    /// Start at the beginning of working hours, no buffer.
    CompactFromDayStart,
    /// Stack after the latest obstacle without a working-hours ceiling.
    Forced,
}

impl Strategy {
    /// Returns a human-readable name for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buffered => "buffered",
            Self::Compact => "compact",
            Self::CompactFromDayStart => "compact from day start",
            Self::Forced => "forced",
        }
    }

    /// Returns true if placements are guaranteed to end within working hours.
    pub fn respects_working_hours(&self) -> bool {
        !matches!(self, Self::Forced)
    }
}

/// Outcome of a single placement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Every meeting was placed.
    Placed(Vec<Event>),
    /// Some meeting had no gap large enough; nothing from this pass is kept.
    NoSolution,
}

impl Attempt {
    /// Returns the placed events, if the pass succeeded.
    pub fn into_placed(self) -> Option<Vec<Event>> {
        match self {
            Self::Placed(events) => Some(events),
            Self::NoSolution => None,
        }
    }
}

/// Proposed placements for every conflicting meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleSuggestion {
    /// The strategy that produced the placements.
    pub strategy: Strategy,
    /// One event per conflicting meeting, in planning order.
    pub events: Vec<Event>,
}

/// Stateless planner parameterised by [`PlannerConfig`].
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner, rejecting invalid policy values.
    pub fn new(config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the planner's configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Finds overlapping pairs after validating the events.
    pub fn find_overlaps(&self, events: &[Event]) -> PlanResult<Vec<Overlap>> {
        validate_all(events)?;
        Ok(find_overlaps(events))
    }

    /// Finds free slots within `date`'s working hours.
    pub fn find_free_slots(&self, events: &[Event], date: NaiveDate) -> PlanResult<Vec<Slot>> {
        validate_all(events)?;
        Ok(find_free_slots(events, date, &self.config.working_hours))
    }

    /// Adds `new_event` to `existing`, moving it out of the way if needed.
    ///
    /// If it overlaps nothing it is appended unchanged. Otherwise it moves to
    /// the start of the first slot in `free_slots` (in the order given) that
    /// can hold it, or, failing that, to `overflow_gap` after the latest end
    /// among `existing`, regardless of working hours.
    ///
    /// The result always holds every existing event, untouched, followed by
    /// the placed new event.
    pub fn auto_resolve_overlaps(
        &self,
        existing: &[Event],
        new_event: Event,
        free_slots: &[Slot],
    ) -> PlanResult<Vec<Event>> {
        validate_all(existing)?;
        new_event.validate()?;

        let mut updated = existing.to_vec();

        if !existing.iter().any(|e| new_event.overlaps(e)) {
            debug!(title = %new_event.title, "no overlap, keeping requested time");
            updated.push(new_event);
            return Ok(updated);
        }

        let duration = new_event.duration();
        let placed = match free_slots.iter().find(|slot| slot.fits(duration)) {
            Some(slot) => {
                debug!(title = %new_event.title, start = %slot.start, "moved into free slot");
                new_event.moved_to(slot.start)
            }
            None => {
                let last_end = existing
                    .iter()
                    .map(|e| e.end)
                    .max()
                    .unwrap_or(new_event.start);
                let start = last_end + self.config.overflow_gap;
                debug!(title = %new_event.title, %start, "no free slot fits, appending after last event");
                new_event.moved_to(start)
            }
        };

        updated.push(placed);
        Ok(updated)
    }

    /// Proposes new times for `conflicting` meetings on `day`.
    ///
    /// Events in `all` that are not conflicting stay fixed. Conflicting
    /// meetings are deduplicated by identity and planned in start order. The
    /// buffer defaults to the configured one.
    ///
    /// This never fails to place: the final [`Strategy::Forced`] pass is
    /// total, possibly running past the end of working hours.
    pub fn suggest_reschedules(
        &self,
        all: &[Event],
        conflicting: &[Event],
        day: NaiveDate,
        buffer: Option<Duration>,
    ) -> PlanResult<RescheduleSuggestion> {
        validate_all(all)?;
        validate_all(conflicting)?;
        let buffer = buffer.unwrap_or(self.config.default_buffer);
        if buffer < Duration::zero() {
            return Err(PlanError::invalid_duration("buffer", buffer));
        }

        let to_reschedule = dedup_sorted(conflicting.iter());
        let moving: HashSet<&str> = to_reschedule.iter().map(|e| e.identity_key()).collect();
        let fixed = dedup_sorted(all.iter().filter(|e| !moving.contains(e.identity_key())));

        let Some(earliest) = to_reschedule.iter().map(|e| e.start).min() else {
            return Ok(RescheduleSuggestion {
                strategy: Strategy::Buffered,
                events: Vec::new(),
            });
        };

        let day_start = self.config.working_hours.start_on(day);
        let smart_start = day_start.max(earliest);
        debug!(
            fixed = fixed.len(),
            moving = to_reschedule.len(),
            %smart_start,
            buffer_minutes = buffer.num_minutes(),
            "planning reschedules"
        );

        let mut cascade = vec![
            (Strategy::Buffered, smart_start, buffer),
            (Strategy::Compact, smart_start, Duration::zero()),
        ];
        if smart_start > day_start {
            cascade.push((Strategy::CompactFromDayStart, day_start, Duration::zero()));
        }

        for (strategy, start_point, gap) in cascade {
            match self.try_schedule(&fixed, &to_reschedule, start_point, gap) {
                Attempt::Placed(events) => {
                    debug!(strategy = strategy.as_str(), "attempt succeeded");
                    return Ok(RescheduleSuggestion { strategy, events });
                }
                Attempt::NoSolution => {
                    debug!(strategy = strategy.as_str(), "attempt found no solution");
                }
            }
        }

        let events = self.force_schedule(&fixed, &to_reschedule, day_start, buffer);
        debug!(strategy = Strategy::Forced.as_str(), "falling back to forced placement");
        Ok(RescheduleSuggestion {
            strategy: Strategy::Forced,
            events,
        })
    }

    /// One greedy pass bounded by the end of working hours on
    /// `start_point`'s date.
    ///
    /// For each meeting the candidate gaps are tried in a fixed order: before
    /// the first obstacle, between consecutive obstacles, after the last
    /// obstacle. The first gap large enough wins. If a meeting fits nowhere
    /// the whole pass fails.
    pub fn try_schedule(
        &self,
        fixed: &[Event],
        to_reschedule: &[Event],
        start_point: NaiveDateTime,
        buffer: Duration,
    ) -> Attempt {
        let working_end = self.config.working_hours.end_on(start_point.date());
        let mut placed: Vec<Event> = Vec::with_capacity(to_reschedule.len());

        for meeting in to_reschedule {
            let duration = meeting.duration();
            let obstacles = obstacles(fixed, &placed);

            let Some(start) = first_fit(&obstacles, start_point, working_end, buffer, duration)
            else {
                trace!(title = %meeting.title, "no gap fits");
                return Attempt::NoSolution;
            };

            trace!(title = %meeting.title, %start, "placed");
            placed.push(meeting.moved_to(start));
        }

        Attempt::Placed(placed)
    }

    /// Stacks each meeting after the latest obstacle end plus `buffer`, never
    /// before `start_point`, with no ceiling.
    fn force_schedule(
        &self,
        fixed: &[Event],
        to_reschedule: &[Event],
        start_point: NaiveDateTime,
        buffer: Duration,
    ) -> Vec<Event> {
        let mut placed: Vec<Event> = Vec::with_capacity(to_reschedule.len());

        for meeting in to_reschedule {
            let start = fixed
                .iter()
                .chain(placed.iter())
                .map(|e| e.end)
                .max()
                .map_or(start_point, |end| (end + buffer).max(start_point));
            placed.push(meeting.moved_to(start));
        }

        placed
    }
}

fn validate_all(events: &[Event]) -> PlanResult<()> {
    events.iter().try_for_each(Event::validate)
}

/// Deduplicates by identity (first wins) and stable-sorts by start.
fn dedup_sorted<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Event> = events
        .filter(|e| seen.insert(e.identity_key()))
        .cloned()
        .collect();
    unique.sort_by_key(|e| e.start);
    unique
}

/// Fixed events and this pass's placements, stable-sorted by start.
fn obstacles<'a>(fixed: &'a [Event], placed: &'a [Event]) -> Vec<&'a Event> {
    let mut all: Vec<&Event> = fixed.iter().chain(placed.iter()).collect();
    all.sort_by_key(|e| e.start);
    all
}

/// Start of the first gap that can hold `duration`, if any.
fn first_fit(
    obstacles: &[&Event],
    start_point: NaiveDateTime,
    working_end: NaiveDateTime,
    buffer: Duration,
    duration: Duration,
) -> Option<NaiveDateTime> {
    let Some((first, rest)) = obstacles.split_first() else {
        return (working_end - start_point >= duration).then_some(start_point);
    };

    if first.start - start_point >= duration {
        return Some(start_point);
    }

    for pair in obstacles.windows(2) {
        let gap_start = (pair[0].end + buffer).max(start_point);
        if pair[1].start - gap_start >= duration {
            return Some(gap_start);
        }
    }

    let last = rest.last().unwrap_or(first);
    let tail_start = (last.end + buffer).max(start_point);
    (working_end - tail_start >= duration).then_some(tail_start)
}
