//! Conversion between stored [`RawEvent`]s and planner [`Event`]s.
//!
//! Timed boundaries are converted to a target time zone and then stripped to
//! the wall clock, since the planner works in local time only. All-day
//! boundaries become midnight of their date.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use slotplan_core::Event;
use tracing::debug;

use crate::raw_event::{RawAttendee, RawEvent, RawEventTime};

/// Converts a stored event to the local wall clock.
pub fn normalize_event(raw: &RawEvent, calendar_id: &str) -> Event {
    normalize_event_in(raw, calendar_id, &Local)
}

/// Converts a stored event to the wall clock of `tz`.
pub fn normalize_event_in<Tz: TimeZone>(raw: &RawEvent, calendar_id: &str, tz: &Tz) -> Event {
    let mut event = Event::new(
        raw.effective_title(),
        wall_clock(&raw.start, tz),
        wall_clock(&raw.end, tz),
    )
    .with_external_id(&raw.id)
    .with_calendar_id(calendar_id)
    .with_attendees(raw.attendees.iter().filter_map(attendee_name).collect());

    if let Some(description) = raw.description.as_deref().filter(|d| !d.trim().is_empty()) {
        event = event.with_description(description);
    }

    event
}

/// Normalizes every event of one calendar.
pub fn normalize_events(raw_events: &[RawEvent], calendar_id: &str) -> Vec<Event> {
    raw_events
        .iter()
        .map(|raw| normalize_event(raw, calendar_id))
        .collect()
}

/// Builds the stored form of `event` under provider id `id`.
///
/// Times are interpreted in the local time zone. Attendees are stored as
/// emails.
pub fn to_raw_event(event: &Event, id: &str) -> RawEvent {
    let mut raw = RawEvent::new(id, local_time(event.start), local_time(event.end))
        .with_summary(&event.title);
    raw.description = event.description.clone();
    raw.attendees = event
        .attendees
        .iter()
        .map(|a| RawAttendee::new(a.as_str()))
        .collect();
    raw
}

/// Writes the title, description and times of `event` into `stored`.
///
/// Attendees and any boundary whose wall clock is unchanged keep their stored
/// form, so emails, all-day dates and original offsets survive a move.
pub fn apply_changes(stored: &mut RawEvent, event: &Event) {
    if stored.effective_title() != event.title {
        stored.summary = Some(event.title.clone());
    }
    let stored_description = stored.description.as_deref().filter(|d| !d.trim().is_empty());
    if stored_description != event.description.as_deref() {
        stored.description = event.description.clone();
    }
    if wall_clock(&stored.start, &Local) != event.start {
        stored.start = local_time(event.start);
    }
    if wall_clock(&stored.end, &Local) != event.end {
        stored.end = local_time(event.end);
    }
}

fn wall_clock<Tz: TimeZone>(time: &RawEventTime, tz: &Tz) -> NaiveDateTime {
    match time {
        RawEventTime::DateTime(dt) => dt.with_timezone(tz).naive_local(),
        RawEventTime::Date(date) => date.and_time(chrono::NaiveTime::MIN),
    }
}

fn local_time(naive: NaiveDateTime) -> RawEventTime {
    let resolved: DateTime<FixedOffset> = match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.fixed_offset(),
        None => {
            // Skipped by a DST transition; keep the wall clock as UTC.
            debug!(%naive, "local time does not exist, storing as UTC");
            naive.and_utc().fixed_offset()
        }
    };
    RawEventTime::DateTime(resolved)
}

/// Display name when non-blank, else email; `None` when both are blank.
fn attendee_name(attendee: &RawAttendee) -> Option<String> {
    attendee
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| Some(attendee.email.trim()).filter(|e| !e.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn timed(rfc3339: &str) -> RawEventTime {
        RawEventTime::DateTime(DateTime::parse_from_rfc3339(rfc3339).unwrap())
    }

    mod normalize {
        use super::*;

        #[test]
        fn timed_event_in_utc() {
            let raw = RawEvent::new(
                "g-1",
                timed("2025-03-10T10:00:00+01:00"),
                timed("2025-03-10T11:30:00+01:00"),
            )
            .with_summary("Design review")
            .with_description("Agenda in doc");

            let event = normalize_event_in(&raw, "work", &Utc);
            assert_eq!(event.title, "Design review");
            assert_eq!(event.start, date(10).and_hms_opt(9, 0, 0).unwrap());
            assert_eq!(event.end, date(10).and_hms_opt(10, 30, 0).unwrap());
            assert_eq!(event.external_id.as_deref(), Some("g-1"));
            assert_eq!(event.calendar_id, "work");
            assert_eq!(event.description.as_deref(), Some("Agenda in doc"));
        }

        #[test]
        fn timed_event_in_other_offset() {
            let raw = RawEvent::new(
                "g-1",
                timed("2025-03-10T10:00:00Z"),
                timed("2025-03-10T11:00:00Z"),
            );
            let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

            let event = normalize_event_in(&raw, "primary", &tokyo);
            assert_eq!(event.start, date(10).and_hms_opt(19, 0, 0).unwrap());
            assert_eq!(event.duration_minutes(), 60);
        }

        #[test]
        fn all_day_event_starts_at_midnight() {
            let raw = RawEvent::new("g-2", RawEventTime::Date(date(10)), RawEventTime::Date(date(11)))
                .with_summary("Conference");

            let event = normalize_event(&raw, "primary");
            assert_eq!(event.start, date(10).and_hms_opt(0, 0, 0).unwrap());
            assert_eq!(event.end, date(11).and_hms_opt(0, 0, 0).unwrap());
        }

        #[test]
        fn missing_title() {
            let raw = RawEvent::new("g-3", RawEventTime::Date(date(10)), RawEventTime::Date(date(11)));
            assert_eq!(normalize_event(&raw, "primary").title, "(No title)");
        }

        #[test]
        fn attendees_prefer_display_name() {
            let raw = RawEvent::new("g-4", RawEventTime::Date(date(10)), RawEventTime::Date(date(10)))
                .with_attendee(RawAttendee::new("alice@example.com").with_display_name("Alice"))
                .with_attendee(RawAttendee::new("bob@example.com").with_display_name("  "))
                .with_attendee(RawAttendee::new("carol@example.com"))
                .with_attendee(RawAttendee::new(""));

            let event = normalize_event(&raw, "primary");
            assert_eq!(
                event.attendees,
                vec!["Alice", "bob@example.com", "carol@example.com"]
            );
        }

        #[test]
        fn blank_description_is_dropped() {
            let raw = RawEvent::new("g-5", RawEventTime::Date(date(10)), RawEventTime::Date(date(10)))
                .with_description("   ");
            assert!(normalize_event(&raw, "primary").description.is_none());
        }

        #[test]
        fn normalize_events_keeps_order() {
            let raws = vec![
                RawEvent::new("b", RawEventTime::Date(date(11)), RawEventTime::Date(date(12))),
                RawEvent::new("a", RawEventTime::Date(date(10)), RawEventTime::Date(date(11))),
            ];
            let events = normalize_events(&raws, "team");
            let ids: Vec<_> = events.iter().map(|e| e.identity_key()).collect();
            assert_eq!(ids, vec!["b", "a"]);
            assert!(events.iter().all(|e| e.calendar_id == "team"));
        }
    }

    mod to_raw {
        use super::*;

        #[test]
        fn local_round_trip() {
            let start = date(10).and_hms_opt(10, 0, 0).unwrap();
            let event = Event::new("Sync", start, start + chrono::Duration::minutes(45))
                .with_description("notes")
                .with_attendee("alice@example.com");

            let raw = to_raw_event(&event, "g-9");
            assert_eq!(raw.id, "g-9");
            assert_eq!(raw.summary.as_deref(), Some("Sync"));
            assert!(!raw.is_all_day());

            let back = normalize_event(&raw, "primary");
            assert_eq!(back.start, event.start);
            assert_eq!(back.end, event.end);
            assert_eq!(back.title, event.title);
            assert_eq!(back.description, event.description);
            assert_eq!(back.attendees, event.attendees);
            assert_eq!(back.external_id.as_deref(), Some("g-9"));
        }
    }

    mod write_back {
        use super::*;

        #[test]
        fn untouched_fields_keep_stored_form() {
            let mut stored =
                RawEvent::new("off", RawEventTime::Date(date(10)), RawEventTime::Date(date(11)))
                    .with_description("  ")
                    .with_attendee(RawAttendee::new("alice@example.com").with_display_name("Alice"));
            let original = stored.clone();

            let event = normalize_event(&stored, "primary");
            apply_changes(&mut stored, &event);
            assert_eq!(stored, original);
        }

        #[test]
        fn moved_boundaries_are_rewritten() {
            let start = date(10).and_hms_opt(10, 0, 0).unwrap();
            let mut stored = to_raw_event(
                &Event::new("Sync", start, start + chrono::Duration::hours(1)),
                "g-1",
            );
            stored.attendees = vec![RawAttendee::new("bob@example.com").with_display_name("Bob")];

            let moved = normalize_event(&stored, "primary")
                .moved_to(start + chrono::Duration::hours(3))
                .with_description("moved");
            apply_changes(&mut stored, &moved);

            let back = normalize_event(&stored, "primary");
            assert_eq!(back.start, moved.start);
            assert_eq!(back.end, moved.end);
            assert_eq!(back.description.as_deref(), Some("moved"));
            assert_eq!(stored.attendees[0].email, "bob@example.com");
        }
    }
}
