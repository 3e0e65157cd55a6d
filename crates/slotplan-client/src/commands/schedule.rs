//! `slotplan schedule`

use std::fmt::Write;

use slotplan_providers::CalendarProvider;

use crate::error::ClientResult;
use crate::service::{MeetingRequest, ScheduleOutcome, SchedulingService};

use super::print_json;

pub async fn run<P: CalendarProvider>(
    service: &SchedulingService<P>,
    request: MeetingRequest,
    json: bool,
) -> ClientResult<()> {
    let requested = request.start;
    let outcome = service.schedule_meeting(request).await?;

    if json {
        return print_json(&outcome);
    }
    print!("{}", render(&outcome, requested));
    Ok(())
}

fn render(outcome: &ScheduleOutcome, requested: chrono::NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Created: {}", outcome.created);
    if outcome.moved {
        let _ = writeln!(
            out,
            "  moved from {} because the requested time was taken",
            requested.format("%H:%M")
        );
    }
    for event in &outcome.updated {
        let _ = writeln!(out, "Updated: {event}");
    }
    for failure in &outcome.failed {
        let _ = writeln!(out, "Failed to update {}: {}", failure.event, failure.error);
    }
    out
}
