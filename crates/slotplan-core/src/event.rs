//! The event model shared by every planning operation.
//!
//! An [`Event`] is a titled interval on the local wall clock. Events carry a
//! local id (always present) and an optional provider-issued external id; an
//! event without an external id has not been persisted yet.
//!
//! Two notions of "the same event" exist and are kept deliberately apart:
//!
//! - [`Event::is_same_event`]: structural: title, start and end all match.
//!   Used to suppress self-conflicts and to deduplicate overlap pairs.
//! - [`Event::identity_key`]: identity: the external id when present,
//!   otherwise the local id. Used to partition fixed and movable events.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::time::{TimeWindow, intervals_overlap};

/// Calendar identifier used when none is given.
pub const PRIMARY_CALENDAR: &str = "primary";

fn default_calendar_id() -> String {
    PRIMARY_CALENDAR.to_string()
}

fn new_local_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A scheduled interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Locally unique identifier.
    #[serde(default = "new_local_id")]
    pub id: String,
    /// Identifier issued by the calendar provider, if persisted.
    #[serde(default)]
    pub external_id: Option<String>,
    /// The calendar this event belongs to.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// The event title.
    pub title: String,
    /// When the event starts (inclusive).
    pub start: NaiveDateTime,
    /// When the event ends (exclusive).
    pub end: NaiveDateTime,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attendee identifiers (display names or emails).
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl Event {
    /// Creates an unpersisted event on the primary calendar.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: new_local_id(),
            external_id: None,
            calendar_id: default_calendar_id(),
            title: title.into(),
            start,
            end,
            description: None,
            attendees: Vec::new(),
        }
    }

    /// Builder method to set the local id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to set the provider-issued id.
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Builder method to set the owning calendar.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to add an attendee.
    pub fn with_attendee(mut self, attendee: impl Into<String>) -> Self {
        self.attendees.push(attendee.into());
        self
    }

    /// Builder method to set attendees.
    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    /// Returns the length of the event.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the length of the event in minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Returns the event's interval.
    ///
    /// Inverted events yield an empty window at `start`.
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end.max(self.start),
        }
    }

    /// Returns true if the provider has issued an id for this event.
    pub fn is_persisted(&self) -> bool {
        self.external_id.is_some()
    }

    /// Returns true if the event starts on `date`.
    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.date() == date
    }

    /// Half-open overlap test against another event.
    ///
    /// Events that merely touch, and zero-length events, never overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        intervals_overlap(self.start, self.end, other.start, other.end)
    }

    /// Structural equality: same title, start and end.
    ///
    /// This is weaker than identity. Two distinct meetings that share a title
    /// and exact timing are considered the same event.
    pub fn is_same_event(&self, other: &Event) -> bool {
        self.title == other.title && self.start == other.start && self.end == other.end
    }

    /// Key matching [`Event::is_same_event`], suitable for hashing.
    pub fn same_event_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.title,
            self.start.format("%Y-%m-%dT%H:%M:%S%.f"),
            self.end.format("%Y-%m-%dT%H:%M:%S%.f")
        )
    }

    /// Identity key: the external id when present, otherwise the local id.
    pub fn identity_key(&self) -> &str {
        self.external_id.as_deref().unwrap_or(&self.id)
    }

    /// Returns a copy moved to start at `start`, keeping its duration.
    pub fn moved_to(&self, start: NaiveDateTime) -> Event {
        let duration = self.duration();
        Event {
            start,
            end: start + duration,
            ..self.clone()
        }
    }

    /// Returns true if start, end or title differ from `other`.
    pub fn differs_in_schedule(&self, other: &Event) -> bool {
        self.start != other.start || self.end != other.end || self.title != other.title
    }

    /// Rejects events that end before they start.
    pub fn validate(&self) -> PlanResult<()> {
        if self.end < self.start {
            return Err(PlanError::InvalidEvent {
                title: self.title.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}-{}",
            self.title,
            self.start.format("%d %b %Y %H:%M"),
            self.end.format("%H:%M")
        )?;
        if !self.attendees.is_empty() {
            write!(f, " ({})", self.attendees.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_event() -> Event {
        Event::new("Design Review", at(10, 0), at(11, 0))
    }

    #[test]
    fn basic_creation() {
        let event = sample_event();
        assert_eq!(event.title, "Design Review");
        assert_eq!(event.calendar_id, PRIMARY_CALENDAR);
        assert!(!event.is_persisted());
        assert!(!event.id.is_empty());
        assert_eq!(event.duration_minutes(), 60);
    }

    #[test]
    fn local_ids_are_unique() {
        assert_ne!(sample_event().id, sample_event().id);
    }

    #[test]
    fn builder_pattern() {
        let event = sample_event()
            .with_id("local-1")
            .with_external_id("g-123")
            .with_calendar_id("team@example.com")
            .with_description("Quarterly review")
            .with_attendee("alice@example.com")
            .with_attendee("Bob");

        assert_eq!(event.id, "local-1");
        assert_eq!(event.external_id.as_deref(), Some("g-123"));
        assert_eq!(event.calendar_id, "team@example.com");
        assert_eq!(event.description.as_deref(), Some("Quarterly review"));
        assert_eq!(event.attendees, vec!["alice@example.com", "Bob"]);
        assert!(event.is_persisted());
    }

    #[test]
    fn same_event_is_structural() {
        let a = sample_event().with_external_id("a");
        let b = sample_event()
            .with_external_id("b")
            .with_description("different");
        assert!(a.is_same_event(&b));
        assert_eq!(a.same_event_key(), b.same_event_key());
        assert_ne!(a, b);

        let renamed = Event::new("Other", at(10, 0), at(11, 0));
        assert!(!a.is_same_event(&renamed));
        let shifted = Event::new("Design Review", at(10, 0), at(11, 30));
        assert!(!a.is_same_event(&shifted));
    }

    #[test]
    fn identity_prefers_external_id() {
        let local = sample_event().with_id("local-1");
        assert_eq!(local.identity_key(), "local-1");

        let persisted = local.with_external_id("g-1");
        assert_eq!(persisted.identity_key(), "g-1");
    }

    #[test]
    fn overlap_is_half_open() {
        let a = Event::new("A", at(10, 0), at(11, 0));
        let b = Event::new("B", at(10, 30), at(11, 30));
        let c = Event::new("C", at(11, 0), at(12, 0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn zero_length_never_overlaps() {
        let a = Event::new("A", at(10, 0), at(11, 0));
        let point = Event::new("Ping", at(10, 30), at(10, 30));
        assert!(!a.overlaps(&point));
        assert!(!point.overlaps(&a));
    }

    #[test]
    fn moved_to_keeps_duration_and_identity() {
        let event = sample_event()
            .with_external_id("g-1")
            .with_attendee("alice@example.com");
        let moved = event.moved_to(at(14, 15));
        assert_eq!(moved.start, at(14, 15));
        assert_eq!(moved.end, at(15, 15));
        assert_eq!(moved.id, event.id);
        assert_eq!(moved.external_id, event.external_id);
        assert_eq!(moved.attendees, event.attendees);
        assert!(moved.differs_in_schedule(&event));
        assert!(!event.differs_in_schedule(&event.clone()));
    }

    #[test]
    fn validate_rejects_inverted_events() {
        assert!(sample_event().validate().is_ok());
        assert!(Event::new("Point", at(10, 0), at(10, 0)).validate().is_ok());

        let err = Event::new("Broken", at(11, 0), at(10, 0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidEvent { ref title, .. } if title == "Broken"));
    }

    #[test]
    fn display_format() {
        let event = sample_event().with_attendee("alice").with_attendee("bob");
        assert_eq!(
            event.to_string(),
            "Design Review at 10 Mar 2025 10:00-11:00 (alice, bob)"
        );
    }

    #[test]
    fn deserialize_fills_defaults() {
        let json = r#"{
            "title": "Standup",
            "start": "2025-03-10T09:00:00",
            "end": "2025-03-10T09:15:00"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.calendar_id, PRIMARY_CALENDAR);
        assert!(event.external_id.is_none());
        assert!(!event.id.is_empty());
        assert!(event.attendees.is_empty());
        assert_eq!(event.duration_minutes(), 15);
    }

    #[test]
    fn serde_roundtrip() {
        let event = sample_event().with_external_id("g-1").with_attendee("carol");
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
