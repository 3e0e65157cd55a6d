//! `slotplan events`

use chrono::NaiveDate;
use slotplan_core::{TimeWindow, format_schedule};
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
    let window = TimeWindow::for_days(date_or_today(from), days);
    let events = service.events(window).await?;

    if json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("No events.");
    } else {
        print!("{}", format_schedule(&events));
    }
    Ok(())
}
