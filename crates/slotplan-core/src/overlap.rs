//! Pairwise overlap detection.
//!
//! [`find_overlaps`] sorts events by start and, for each event, scans forward
//! only while later events start before it ends. Because starts are sorted,
//! the first event that fails the test ends the scan for that event.
//!
//! Pairs of structurally identical events (same title, start and end, see
//! [`Event::is_same_event`]) are never reported. This also hides genuine
//! conflicts between two different meetings that happen to share a title and
//! exact timing; callers that need those must compare identities themselves.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::Event;

/// Two events that share at least one instant.
///
/// `first` starts no later than `second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub first: Event,
    pub second: Event,
}

impl Overlap {
    /// Returns true if `event` is one side of this overlap, matched by
    /// [`Event::identity_key`].
    pub fn involves(&self, event: &Event) -> bool {
        let key = event.identity_key();
        self.first.identity_key() == key || self.second.identity_key() == key
    }
}

/// Finds every overlapping pair of events.
///
/// No pair is reported twice in either order, and no pair of structurally
/// identical events is reported.
pub fn find_overlaps(events: &[Event]) -> Vec<Overlap> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.start);

    let mut seen = HashSet::new();
    let mut overlaps = Vec::new();

    for (i, current) in sorted.iter().enumerate() {
        for other in &sorted[i + 1..] {
            if other.start >= current.end {
                break;
            }
            if current.is_same_event(other) || !current.overlaps(other) {
                continue;
            }

            if seen.insert(pair_key(current, other)) {
                trace!(first = %current.title, second = %other.title, "overlap");
                overlaps.push(Overlap {
                    first: (*current).clone(),
                    second: (*other).clone(),
                });
            }
        }
    }

    overlaps
}

/// Order-independent key for a pair of events.
fn pair_key(a: &Event, b: &Event) -> String {
    let (a, b) = (a.same_event_key(), b.same_event_key());
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// Flattens overlap pairs into the distinct events involved.
///
/// Events are deduplicated by [`Event::identity_key`], keeping the first
/// occurrence in pair order.
pub fn conflicting_events(overlaps: &[Overlap]) -> Vec<Event> {
    let mut seen = HashSet::new();
    overlaps
        .iter()
        .flat_map(|o| [&o.first, &o.second])
        .filter(|e| seen.insert(e.identity_key().to_string()))
        .cloned()
        .collect()
}
