//! Plain-text rendering of slots and events.

use crate::event::Event;
use crate::time::Slot;

const CLOCK: &str = "%H:%M";

/// Renders a slot as `Free: HH:MM - HH:MM`.
pub fn format_free_slot(slot: &Slot) -> String {
    format!(
        "Free: {} - {}",
        slot.start.format(CLOCK),
        slot.end.format(CLOCK)
    )
}

pub fn format_free_slots(slots: &[Slot]) -> Vec<String> {
    slots.iter().map(format_free_slot).collect()
}

/// Renders an event as `HH:MM-HH:MM  Title`.
///
/// Events ending on a later day show the end date too.
pub fn format_event_line(event: &Event) -> String {
    let end = if event.end.date() == event.start.date() {
        event.end.format(CLOCK).to_string()
    } else {
        event.end.format("%Y-%m-%d %H:%M").to_string()
    };
    let mut line = format!("{}-{}  {}", event.start.format(CLOCK), end, event.title);
    if !event.attendees.is_empty() {
        line.push_str(&format!(" ({})", event.attendees.join(", ")));
    }
    line
}

/// Renders events grouped under a date heading, in start order.
pub fn format_schedule(events: &[Event]) -> String {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.start);

    let mut out = String::new();
    let mut current_day = None;
    for event in sorted {
        let day = event.start.date();
        if current_day != Some(day) {
            if current_day.is_some() {
                out.push('\n');
            }
            out.push_str(&day.format("%A %d %B %Y").to_string());
            out.push('\n');
            current_day = Some(day);
        }
        out.push_str("  ");
        out.push_str(&format_event_line(event));
        out.push('\n');
    }
    out
}
