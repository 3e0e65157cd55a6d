//! Fetch, plan, persist.
//!
//! [`SchedulingService`] ties a [`CalendarProvider`] to the [`Planner`]. It
//! always works on a fresh copy of the provider's events and writes back only
//! what the planner changed. A failed write of a moved event is recorded in
//! the [`PersistReport`] and does not abort the others.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use slotplan_core::{
    Event, Overlap, Planner, RescheduleSuggestion, Slot, TimeWindow, conflicting_events,
};
use slotplan_providers::{CalendarProvider, CalendarSelection, FetchOptions};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// A meeting to add to the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRequest {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    pub attendees: Vec<String>,
    /// Target calendar, primary when `None`.
    pub calendar_id: Option<String>,
}

impl MeetingRequest {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            description: None,
            attendees: Vec::new(),
            calendar_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    fn to_event(&self) -> Event {
        let mut event = Event::new(&self.title, self.start, self.end)
            .with_attendees(self.attendees.clone());
        if let Some(ref description) = self.description {
            event = event.with_description(description);
        }
        if let Some(ref calendar_id) = self.calendar_id {
            event = event.with_calendar_id(calendar_id);
        }
        event
    }
}

/// An event the provider refused to update.
#[derive(Debug, Clone, Serialize)]
pub struct PersistFailure {
    pub event: Event,
    pub error: String,
}

/// Result of writing moved events back to the provider.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistReport {
    /// Events stored successfully, as the provider returned them.
    pub updated: Vec<Event>,
    pub failed: Vec<PersistFailure>,
    /// Changed events that could not be written for lack of an external id.
    pub skipped: Vec<Event>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Result of [`SchedulingService::schedule_meeting`].
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    /// The new meeting as stored.
    pub created: Event,
    /// True if the meeting was moved away from the requested time.
    pub moved: bool,
    pub updated: Vec<Event>,
    pub failed: Vec<PersistFailure>,
    /// The whole day after planning.
    pub all: Vec<Event>,
}

/// Result of [`SchedulingService::suggest_reschedules`].
#[derive(Debug, Clone, Serialize)]
pub struct SuggestOutcome {
    pub overlaps: Vec<Overlap>,
    pub suggestion: RescheduleSuggestion,
    /// Present when the suggestion was applied.
    pub persisted: Option<PersistReport>,
}

/// Orchestrates a provider and the planner.
pub struct SchedulingService<P: CalendarProvider> {
    provider: P,
    planner: Planner,
    calendars: CalendarSelection,
}

impl<P: CalendarProvider> SchedulingService<P> {
    pub fn new(provider: P, planner: Planner) -> Self {
        Self {
            provider,
            planner,
            calendars: CalendarSelection::default(),
        }
    }

    /// Builder method to choose which calendars are read.
    pub fn with_calendars(mut self, calendars: CalendarSelection) -> Self {
        self.calendars = calendars;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Lists events intersecting `window`.
    pub async fn events(&self, window: TimeWindow) -> ClientResult<Vec<Event>> {
        let options = FetchOptions {
            time_window: window,
            calendars: self.calendars.clone(),
        };
        let events = self.provider.fetch_events(options).await?;
        debug!(count = events.len(), start = %window.start, end = %window.end, "fetched events");
        Ok(events)
    }

    async fn day(&self, date: NaiveDate) -> ClientResult<Vec<Event>> {
        self.events(TimeWindow::for_date(date)).await
    }

    /// Finds overlaps among events in `days` days starting at `from`.
    pub async fn overlaps(&self, from: NaiveDate, days: u32) -> ClientResult<Vec<Overlap>> {
        let events = self.events(TimeWindow::for_days(from, days)).await?;
        Ok(self.planner.find_overlaps(&events)?)
    }

    /// Computes free slots within `date`'s working hours.
    pub async fn free_slots(&self, date: NaiveDate) -> ClientResult<Vec<Slot>> {
        let events = self.day(date).await?;
        Ok(self.planner.find_free_slots(&events, date)?)
    }

    /// Adds a meeting, moving it out of the way of existing events.
    ///
    /// Creating the meeting is the only step whose failure is fatal.
    pub async fn schedule_meeting(&self, request: MeetingRequest) -> ClientResult<ScheduleOutcome> {
        let date = request.start.date();
        let existing = self.day(date).await?;
        let slots = self.planner.find_free_slots(&existing, date)?;

        let mut all = self
            .planner
            .auto_resolve_overlaps(&existing, request.to_event(), &slots)?;
        let placed = all
            .pop()
            .ok_or_else(|| ClientError::Internal("planner returned no events".to_string()))?;
        let moved = placed.start != request.start;

        let created = self.provider.create_event(placed).await?;
        info!(
            title = %created.title,
            start = %created.start,
            moved,
            "created meeting"
        );

        let report = self.persist_changes(&existing, &all).await;
        all.push(created.clone());

        Ok(ScheduleOutcome {
            created,
            moved,
            updated: report.updated,
            failed: report.failed,
            all,
        })
    }

    /// Proposes new times for conflicting meetings on `date`.
    ///
    /// Returns `None` when nothing overlaps. With `apply`, moved meetings are
    /// written back.
    pub async fn suggest_reschedules(
        &self,
        date: NaiveDate,
        buffer: Option<Duration>,
        apply: bool,
    ) -> ClientResult<Option<SuggestOutcome>> {
        let events = self.day(date).await?;
        let overlaps = self.planner.find_overlaps(&events)?;
        if overlaps.is_empty() {
            debug!(%date, "no conflicts");
            return Ok(None);
        }

        let conflicting = conflicting_events(&overlaps);
        let suggestion = self
            .planner
            .suggest_reschedules(&events, &conflicting, date, buffer)?;
        info!(
            %date,
            conflicts = conflicting.len(),
            strategy = suggestion.strategy.as_str(),
            "suggested reschedule"
        );

        let persisted = if apply {
            Some(self.persist_changes(&events, &suggestion.events).await)
        } else {
            None
        };

        Ok(Some(SuggestOutcome {
            overlaps,
            suggestion,
            persisted,
        }))
    }

    /// Writes back every planned event whose schedule differs from the
    /// original with the same identity.
    async fn persist_changes(&self, original: &[Event], planned: &[Event]) -> PersistReport {
        let mut report = PersistReport::default();

        for event in planned {
            let Some(before) = original
                .iter()
                .find(|o| o.identity_key() == event.identity_key())
            else {
                continue;
            };
            if !event.differs_in_schedule(before) {
                continue;
            }
            if !event.is_persisted() {
                debug!(title = %event.title, "changed event has no external id, skipping");
                report.skipped.push(event.clone());
                continue;
            }

            match self.provider.update_event(event.clone()).await {
                Ok(stored) => {
                    info!(title = %stored.title, start = %stored.start, "moved event");
                    report.updated.push(stored);
                }
                Err(err) => {
                    warn!(title = %event.title, error = %err, "failed to update event");
                    report.failed.push(PersistFailure {
                        event: event.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotplan_core::Strategy;
    use slotplan_providers::{ErrorProvider, MemoryProvider, ProviderError};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn service(provider: MemoryProvider) -> SchedulingService<MemoryProvider> {
        SchedulingService::new(provider, Planner::default())
    }

    mod schedule {
        use super::*;

        #[tokio::test]
        async fn keeps_requested_time_when_free() {
            let service = service(
                MemoryProvider::new()
                    .with_event(Event::new("Standup", at(9, 0), at(9, 15)).with_external_id("g-1")),
            );

            let outcome = service
                .schedule_meeting(
                    MeetingRequest::new("Review", at(10, 0), at(11, 0))
                        .with_description("Q1 numbers")
                        .with_attendees(vec!["alice@example.com".into()]),
                )
                .await
                .unwrap();

            assert!(!outcome.moved);
            assert_eq!(outcome.created.start, at(10, 0));
            assert!(outcome.created.is_persisted());
            assert_eq!(outcome.created.description.as_deref(), Some("Q1 numbers"));
            assert_eq!(outcome.created.attendees, vec!["alice@example.com"]);
            assert_eq!(outcome.all.len(), 2);
            assert!(outcome.updated.is_empty());
            assert_eq!(service.provider().events().await.len(), 2);
        }

        #[tokio::test]
        async fn moves_into_first_free_slot() {
            let service = service(
                MemoryProvider::new()
                    .with_event(Event::new("Busy", at(9, 0), at(10, 0)).with_external_id("g-1"))
                    .with_event(Event::new("Sync", at(10, 0), at(11, 0)).with_external_id("g-2")),
            );

            let outcome = service
                .schedule_meeting(MeetingRequest::new("Review", at(10, 0), at(11, 0)))
                .await
                .unwrap();

            assert!(outcome.moved);
            assert_eq!(outcome.created.start, at(11, 0));
            assert_eq!(outcome.created.end, at(12, 0));
            assert!(service.provider().updates().await.is_empty());
        }

        #[tokio::test]
        async fn overflows_full_day() {
            let service = service(
                MemoryProvider::new()
                    .with_event(Event::new("Offsite", at(9, 0), at(17, 0)).with_external_id("g-1")),
            );

            let outcome = service
                .schedule_meeting(MeetingRequest::new("Call", at(12, 0), at(12, 30)))
                .await
                .unwrap();
            assert_eq!(outcome.created.start, at(17, 5));
        }

        #[tokio::test]
        async fn create_failure_is_fatal() {
            let service = SchedulingService::new(
                ErrorProvider::new("broken", ProviderError::storage("disk full")),
                Planner::default(),
            );

            let err = service
                .schedule_meeting(MeetingRequest::new("Call", at(12, 0), at(12, 30)))
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Provider(_)));
        }

        #[tokio::test]
        async fn inverted_request_is_rejected() {
            let service = service(MemoryProvider::new());
            let err = service
                .schedule_meeting(MeetingRequest::new("Call", at(12, 0), at(11, 0)))
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Plan(_)));
            assert!(service.provider().events().await.is_empty());
        }
    }

    mod suggest {
        use super::*;

        fn double_booked() -> MemoryProvider {
            MemoryProvider::new()
                .with_event(Event::new("A", at(9, 0), at(10, 0)).with_external_id("g-a"))
                .with_event(Event::new("B", at(9, 0), at(10, 0)).with_external_id("g-b"))
        }

        #[tokio::test]
        async fn none_without_conflicts() {
            let service = service(
                MemoryProvider::new()
                    .with_event(Event::new("A", at(9, 0), at(10, 0)).with_external_id("g-a")),
            );
            assert!(service.suggest_reschedules(day(), None, true).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn dry_run_does_not_write() {
            let service = service(double_booked());

            let outcome = service
                .suggest_reschedules(day(), Some(Duration::minutes(15)), false)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(outcome.overlaps.len(), 1);
            assert_eq!(outcome.suggestion.strategy, Strategy::Buffered);
            assert_eq!(outcome.suggestion.events[1].start, at(10, 15));
            assert!(outcome.persisted.is_none());
            assert!(service.provider().updates().await.is_empty());
        }

        #[tokio::test]
        async fn apply_writes_moved_events_only() {
            let service = service(double_booked());

            let outcome = service
                .suggest_reschedules(day(), None, true)
                .await
                .unwrap()
                .unwrap();
            let report = outcome.persisted.unwrap();
            assert!(report.is_complete());
            assert_eq!(report.updated.len(), 1);
            assert_eq!(report.updated[0].identity_key(), "g-b");

            let updates = service.provider().updates().await;
            assert_eq!(updates.len(), 1);
            assert_eq!(updates[0].start, at(10, 15));
            assert_eq!(updates[0].end, at(11, 15));
        }

        #[tokio::test]
        async fn update_failures_are_collected() {
            let service = service(
                MemoryProvider::new()
                    .with_event(Event::new("A", at(9, 0), at(10, 0)).with_external_id("g-a"))
                    .with_event(Event::new("B", at(9, 30), at(10, 30)).with_external_id("g-b"))
                    .with_event(Event::new("C", at(9, 45), at(10, 45)).with_external_id("g-c"))
                    .with_failing_update("g-b"),
            );

            let outcome = service
                .suggest_reschedules(day(), Some(Duration::zero()), true)
                .await
                .unwrap()
                .unwrap();
            let report = outcome.persisted.unwrap();
            assert!(!report.is_complete());
            assert_eq!(report.failed.len(), 1);
            assert_eq!(report.failed[0].event.identity_key(), "g-b");
            assert!(report.failed[0].error.contains("rejected"));
            assert_eq!(report.updated.len(), 1);
            assert_eq!(report.updated[0].identity_key(), "g-c");
        }
    }

    #[tokio::test]
    async fn free_slots_and_overlaps() {
        let service = service(
            MemoryProvider::new()
                .with_event(Event::new("A", at(10, 0), at(11, 0)).with_external_id("g-a"))
                .with_event(Event::new("B", at(10, 30), at(11, 30)).with_external_id("g-b")),
        );

        let slots = service.free_slots(day()).await.unwrap();
        assert_eq!(
            slots,
            vec![Slot::new(at(9, 0), at(10, 0)), Slot::new(at(11, 30), at(17, 0))]
        );

        let overlaps = service.overlaps(day(), 1).await.unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].first.title, "A");
    }
}
