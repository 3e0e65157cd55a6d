//! `slotplan overlaps`

use chrono::NaiveDate;
use slotplan_core::Overlap;
use slotplan_providers::CalendarProvider;

use crate::error::ClientResult;
use crate::service::SchedulingService;

use super::{date_or_today, print_json};

pub async fn run<P: CalendarProvider>(
    service: &SchedulingService<P>,
    from: Option<NaiveDate>,
    days: u32,
    json: bool,
) -> ClientResult<()> {
    let overlaps = service.overlaps(date_or_today(from), days.max(1)).await?;

    if json {
        return print_json(&overlaps);
    }
    print!("{}", render(&overlaps));
    Ok(())
}

fn render(overlaps: &[Overlap]) -> String {
    if overlaps.is_empty() {
        return "No overlaps.\n".to_string();
    }
    overlaps
        .iter()
        .map(|o| format!("{}\n  overlaps {}\n", o.first, o.second))
        .collect()
}
