//! In-process provider.
//!
//! Holds planner events directly, with switches to make individual calendars
//! or updates fail. Used by tests of the layers above.

use std::collections::HashSet;

use slotplan_core::{Event, PRIMARY_CALENDAR};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{
    BoxFuture, CalendarInfo, CalendarProvider, CalendarSelection, FetchOptions,
    merge_calendar_events, update_target,
};

const NAME: &str = "memory";

#[derive(Debug, Default)]
struct MemoryState {
    calendars: Vec<CalendarInfo>,
    events: Vec<Event>,
    failing_calendars: HashSet<String>,
    failing_updates: HashSet<String>,
    next_id: u64,
    updates: Vec<Event>,
}

/// A provider backed by a `Vec` behind a lock.
#[derive(Debug)]
pub struct MemoryProvider {
    state: RwLock<MemoryState>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    /// Creates a provider with an empty primary calendar.
    pub fn new() -> Self {
        let state = MemoryState {
            calendars: vec![CalendarInfo::new(PRIMARY_CALENDAR, "Primary").with_primary(true)],
            ..MemoryState::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Builder method to add a calendar.
    pub fn with_calendar(mut self, info: CalendarInfo) -> Self {
        self.state.get_mut().calendars.push(info);
        self
    }

    /// Builder method to seed an event as-is.
    ///
    /// Events without an external id get one, like a real store would.
    pub fn with_event(mut self, event: Event) -> Self {
        let state = self.state.get_mut();
        let event = assign_id(state, event);
        state.events.push(event);
        self
    }

    /// Builder method to make fetching `calendar_id` fail.
    pub fn with_failing_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.state.get_mut().failing_calendars.insert(calendar_id.into());
        self
    }

    /// Builder method to make updating `external_id` fail.
    pub fn with_failing_update(mut self, external_id: impl Into<String>) -> Self {
        self.state.get_mut().failing_updates.insert(external_id.into());
        self
    }

    /// Returns every stored event.
    pub async fn events(&self) -> Vec<Event> {
        self.state.read().await.events.clone()
    }

    /// Returns every successful update, in call order.
    pub async fn updates(&self) -> Vec<Event> {
        self.state.read().await.updates.clone()
    }
}

fn assign_id(state: &mut MemoryState, event: Event) -> Event {
    if event.is_persisted() {
        return event;
    }
    state.next_id += 1;
    let id = format!("mem-{}", state.next_id);
    event.with_external_id(id)
}

impl CalendarProvider for MemoryProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move { Ok(self.state.read().await.calendars.clone()) })
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let state = self.state.read().await;
            let calendar_ids: Vec<String> = match &options.calendars {
                CalendarSelection::All => state.calendars.iter().map(|c| c.id.clone()).collect(),
                CalendarSelection::Ids(ids) => ids.clone(),
            };

            let per_calendar = calendar_ids
                .into_iter()
                .map(|calendar_id| {
                    let result = if state.failing_calendars.contains(&calendar_id) {
                        Err(ProviderError::calendar(format!(
                            "calendar {calendar_id} is unavailable"
                        ))
                        .with_provider(NAME))
                    } else {
                        Ok(state
                            .events
                            .iter()
                            .filter(|e| e.calendar_id == calendar_id && options.includes(e))
                            .cloned()
                            .collect())
                    };
                    (calendar_id, result)
                })
                .collect();

            Ok(merge_calendar_events(NAME, per_calendar))
        })
    }

    fn create_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        Box::pin(async move {
            event.validate().map_err(|e| {
                ProviderError::bad_request(e.to_string()).with_provider(NAME)
            })?;
            let mut state = self.state.write().await;
            let mut event = event;
            event.external_id = None;
            let stored = assign_id(&mut state, event);
            debug!(id = ?stored.external_id, title = %stored.title, "created event");
            state.events.push(stored.clone());
            Ok(stored)
        })
    }

    fn update_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        Box::pin(async move {
            let (calendar_id, id) =
                update_target(&event).map_err(|e| e.with_provider(NAME))?;
            let mut state = self.state.write().await;

            if state.failing_updates.contains(id) {
                return Err(
                    ProviderError::calendar(format!("update of {id} rejected")).with_provider(NAME)
                );
            }

            let Some(slot) = state
                .events
                .iter_mut()
                .find(|e| e.calendar_id == calendar_id && e.external_id.as_deref() == Some(id))
            else {
                return Err(ProviderError::not_found(format!(
                    "event {id} not found in calendar {calendar_id}"
                ))
                .with_provider(NAME));
            };

            *slot = event.clone();
            state.updates.push(event.clone());
            Ok(event)
        })
    }
}
