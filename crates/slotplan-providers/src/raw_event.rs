//! Event payloads as calendar backends store them.
//!
//! [`RawEvent`] follows the shape of a Google Calendar event resource, which
//! is also the on-disk format of the file store:
//!
//! ```json
//! {
//!   "id": "evt-1",
//!   "summary": "Design review",
//!   "start": { "dateTime": "2025-03-10T10:00:00+01:00" },
//!   "end": { "dateTime": "2025-03-10T11:00:00+01:00" },
//!   "attendees": [{ "email": "alice@example.com", "displayName": "Alice" }]
//! }
//! ```
//!
//! All-day events use `{ "date": "2025-03-10" }` instead.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Start or end of a raw event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawEventTime {
    /// A timed boundary with its UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// An all-day boundary.
    Date(NaiveDate),
}

impl RawEventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Someone invited to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendee {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl RawAttendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// A stored calendar event before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Provider-issued identifier, unique across calendars.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: RawEventTime,
    pub end: RawEventTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<RawAttendee>,
}

impl RawEvent {
    pub fn new(id: impl Into<String>, start: RawEventTime, end: RawEventTime) -> Self {
        Self {
            id: id.into(),
            summary: None,
            description: None,
            start,
            end,
            attendees: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attendee(mut self, attendee: RawAttendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Returns the summary, or "(No title)" when missing or blank.
    pub fn effective_title(&self) -> &str {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("(No title)")
    }

    /// Returns true if the event spans whole days.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_title_falls_back() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let raw = RawEvent::new("e1", RawEventTime::Date(date), RawEventTime::Date(date));
        assert_eq!(raw.effective_title(), "(No title)");

        let blank = raw.clone().with_summary("   ");
        assert_eq!(blank.effective_title(), "(No title)");

        let titled = raw.with_summary("Holiday");
        assert_eq!(titled.effective_title(), "Holiday");
        assert!(titled.is_all_day());
    }

    #[test]
    fn parses_google_shape() {
        let json = r#"{
            "id": "evt-1",
            "summary": "Design review",
            "start": { "dateTime": "2025-03-10T10:00:00+01:00" },
            "end": { "dateTime": "2025-03-10T11:00:00+01:00" },
            "attendees": [
                { "email": "alice@example.com", "displayName": "Alice" },
                { "email": "bob@example.com" }
            ]
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, "evt-1");
        assert!(!raw.is_all_day());
        assert_eq!(raw.attendees.len(), 2);
        assert_eq!(raw.attendees[0].display_name.as_deref(), Some("Alice"));
        assert!(raw.attendees[1].display_name.is_none());
        match raw.start {
            RawEventTime::DateTime(dt) => assert_eq!(dt.offset().local_minus_utc(), 3600),
            RawEventTime::Date(_) => panic!("expected a timed event"),
        }
    }

    #[test]
    fn parses_all_day_event() {
        let json = r#"{
            "id": "evt-2",
            "start": { "date": "2025-03-10" },
            "end": { "date": "2025-03-11" }
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        assert!(raw.is_all_day());
        assert_eq!(raw.effective_title(), "(No title)");
        assert!(raw.attendees.is_empty());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let raw = RawEvent::new("e1", RawEventTime::Date(date), RawEventTime::Date(date));
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "e1",
                "start": { "date": "2025-03-10" },
                "end": { "date": "2025-03-10" }
            })
        );
    }
}
