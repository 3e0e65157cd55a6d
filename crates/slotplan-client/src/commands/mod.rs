//! Command handlers.
//!
//! Each handler renders either human text or JSON and prints it.

pub mod config;
pub mod events;
pub mod free_slots;
pub mod overlaps;
pub mod schedule;
pub mod suggest;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::ClientResult;

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolves an optional date argument to today.
pub(crate) fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}
