//! The [`CalendarProvider`] trait.
//!
//! A provider owns one or more calendars and hands out planner [`Event`]s.
//! Implementations convert their stored form through
//! [`normalize_event`](crate::normalize_event) and merge calendars with
//! [`merge_calendar_events`].

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use slotplan_core::{Event, PRIMARY_CALENDAR, TimeWindow};
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// A calendar exposed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl CalendarInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_primary: false,
        }
    }

    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Which calendars a fetch reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSelection {
    /// Every calendar the provider lists.
    All,
    /// Only these calendars, in order.
    Ids(Vec<String>),
}

impl Default for CalendarSelection {
    fn default() -> Self {
        Self::Ids(vec![PRIMARY_CALENDAR.to_string()])
    }
}

/// Options for [`CalendarProvider::fetch_events`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Only events intersecting this window are returned.
    pub time_window: TimeWindow,
    pub calendars: CalendarSelection,
}

impl FetchOptions {
    /// Fetches `window` from the primary calendar.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            time_window: window,
            calendars: CalendarSelection::default(),
        }
    }

    /// Builder method to read every calendar.
    pub fn with_all_calendars(mut self) -> Self {
        self.calendars = CalendarSelection::All;
        self
    }

    /// Builder method to read specific calendars.
    pub fn with_calendar_ids(mut self, ids: Vec<String>) -> Self {
        self.calendars = CalendarSelection::Ids(ids);
        self
    }

    /// Returns true if `event` intersects the time window.
    ///
    /// Zero-length events count when their instant lies inside the window.
    pub fn includes(&self, event: &Event) -> bool {
        if event.start == event.end {
            self.time_window.contains(event.start)
        } else {
            self.time_window.overlaps_range(event.start, event.end)
        }
    }
}

/// A boxed future so the trait stays object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar backend that can list, create and update events.
///
/// # Implementation notes
///
/// - `fetch_events` merges every selected calendar; a calendar that fails to
///   load is logged and skipped, not fatal.
/// - Returned events carry their provider id in `external_id`.
pub trait CalendarProvider: Send + Sync {
    /// Short provider name, e.g. "file".
    fn name(&self) -> &str;

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;

    /// Returns events intersecting the window, sorted by start and
    /// deduplicated by external id.
    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<Event>>>;

    /// Stores a new event in its calendar and returns it with a fresh
    /// external id.
    fn create_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>>;

    /// Replaces a stored event's schedule and details.
    ///
    /// # Errors
    ///
    /// `bad_request` if the event has no external id or no calendar id,
    /// `not_found` if the provider has no such event.
    fn update_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>>;
}

/// Checks the fields every update needs and returns `(calendar, id)`.
pub fn update_target(event: &Event) -> ProviderResult<(&str, &str)> {
    let id = event
        .external_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ProviderError::bad_request(format!("event '{}' has no external id", event.title))
        })?;
    if event.calendar_id.is_empty() {
        return Err(ProviderError::bad_request(format!(
            "event '{}' has no calendar id",
            event.title
        )));
    }
    Ok((event.calendar_id.as_str(), id))
}

/// Merges per-calendar fetch results.
///
/// Failed calendars are logged and skipped. Events are deduplicated by
/// external id, the first calendar winning, and stable-sorted by start.
pub fn merge_calendar_events(
    provider: &str,
    per_calendar: Vec<(String, ProviderResult<Vec<Event>>)>,
) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (calendar_id, result) in per_calendar {
        match result {
            Ok(events) => merged.extend(
                events
                    .into_iter()
                    .filter(|e| seen.insert(e.identity_key().to_string())),
            ),
            Err(err) => {
                warn!(provider, calendar = %calendar_id, error = %err, "skipping calendar");
            }
        }
    }

    merged.sort_by_key(|e| e.start);
    merged
}

/// A provider that fails every call.
///
/// Stands in for a backend that could not be set up.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn fail<T: Send + 'static>(&self) -> BoxFuture<'_, ProviderResult<T>> {
        let error = self.error.shallow_clone().with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}

impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        self.fail()
    }

    fn fetch_events(&self, _options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        self.fail()
    }

    fn create_event(&self, _event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        self.fail()
    }

    fn update_event(&self, _event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        self.fail()
    }
}
