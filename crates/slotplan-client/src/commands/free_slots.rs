//! `slotplan free-slots`

use chrono::NaiveDate;
use slotplan_core::format_free_slots;
use slotplan_providers::CalendarProvider;

use crate::error::ClientResult;
use crate::service::SchedulingService;

use super::{date_or_today, print_json};

pub async fn run<P: CalendarProvider>(
    service: &SchedulingService<P>,
    date: Option<NaiveDate>,
    json: bool,
) -> ClientResult<()> {
    let slots = service.free_slots(date_or_today(date)).await?;

    if json {
        return print_json(&slots);
    }
    if slots.is_empty() {
        println!("No free slots.");
    }
    for line in format_free_slots(&slots) {
        println!("{line}");
    }
    Ok(())
}
