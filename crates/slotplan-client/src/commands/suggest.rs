//! `slotplan suggest`

use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use slotplan_core::format_event_line;
use slotplan_providers::CalendarProvider;

use crate::error::ClientResult;
use crate::service::{SchedulingService, SuggestOutcome};

use super::{date_or_today, print_json};

pub async fn run<P: CalendarProvider>(
    service: &SchedulingService<P>,
    date: Option<NaiveDate>,
    buffer: Option<u32>,
    apply: bool,
    json: bool,
) -> ClientResult<()> {
    let buffer = buffer.map(|minutes| Duration::minutes(i64::from(minutes)));
    let outcome = service
        .suggest_reschedules(date_or_today(date), buffer, apply)
        .await?;

    if json {
        return print_json(&outcome);
    }
    match outcome {
        Some(outcome) => print!("{}", render(&outcome)),
        None => println!("No conflicts found."),
    }
    Ok(())
}

fn render(outcome: &SuggestOutcome) -> String {
    let suggestion = &outcome.suggestion;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} overlapping pair(s), strategy: {}",
        outcome.overlaps.len(),
        suggestion.strategy.as_str()
    );
    for event in &suggestion.events {
        let _ = writeln!(out, "  {}", format_event_line(event));
    }
    if !suggestion.strategy.respects_working_hours() {
        let _ = writeln!(out, "Some meetings may run past working hours.");
    }

    if let Some(report) = &outcome.persisted {
        let _ = writeln!(out, "Updated {} event(s).", report.updated.len());
        for failure in &report.failed {
            let _ = writeln!(out, "Failed to update {}: {}", failure.event, failure.error);
        }
        for event in &report.skipped {
            let _ = writeln!(out, "Skipped unsaved event {event}");
        }
    }
    out
}
