//! Free capacity within a working day.

use chrono::NaiveDate;

use crate::event::Event;
use crate::time::{Slot, WorkingHours};

/// Returns the parts of `date`'s working window not covered by any event
/// starting on that date.
///
/// Slots are ordered, non-overlapping, and together with the events clipped
/// to the window they tile the window exactly. An event contained in an
/// earlier one never moves the cursor backwards.
pub fn find_free_slots(events: &[Event], date: NaiveDate, hours: &WorkingHours) -> Vec<Slot> {
    let window = hours.window_on(date);

    let mut day_events: Vec<&Event> = events.iter().filter(|e| e.starts_on(date)).collect();
    day_events.sort_by_key(|e| e.start);

    let mut slots = Vec::new();
    let mut cursor = window.start;

    for event in day_events {
        if event.start > cursor {
            let end = event.start.min(window.end);
            if end > cursor {
                slots.push(Slot { start: cursor, end });
            }
        }
        cursor = cursor.max(event.end);
    }

    if cursor < window.end {
        slots.push(Slot {
            start: cursor,
            end: window.end,
        });
    }

    slots
}
