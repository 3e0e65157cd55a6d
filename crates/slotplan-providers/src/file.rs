//! Provider backed by a JSON document on disk.
//!
//! The document lists calendars, each holding [`RawEvent`]s:
//!
//! ```json
//! {
//!   "calendars": [
//!     { "id": "primary", "name": "Primary", "primary": true, "events": [] }
//!   ]
//! }
//! ```
//!
//! A missing file reads as a store with one empty primary calendar. Writes
//! go to a sibling temporary file which then replaces the document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slotplan_core::{Event, PRIMARY_CALENDAR};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::normalize::{apply_changes, normalize_event, to_raw_event};
use crate::provider::{
    BoxFuture, CalendarInfo, CalendarProvider, CalendarSelection, FetchOptions,
    merge_calendar_events, update_target,
};
use crate::raw_event::RawEvent;

const NAME: &str = "file";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    calendars: Vec<StoredCalendar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCalendar {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    events: Vec<RawEvent>,
}

impl StoredCalendar {
    fn info(&self) -> CalendarInfo {
        let name = if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        CalendarInfo::new(&self.id, name).with_primary(self.primary)
    }

    fn events_in(&self, options: &FetchOptions) -> Vec<Event> {
        self.events
            .iter()
            .map(|raw| normalize_event(raw, &self.id))
            .filter(|event| match event.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(calendar = %self.id, error = %err, "ignoring stored event");
                    false
                }
            })
            .filter(|event| options.includes(event))
            .collect()
    }
}

impl StoreDocument {
    fn with_primary() -> Self {
        Self {
            calendars: vec![StoredCalendar {
                id: PRIMARY_CALENDAR.to_string(),
                name: "Primary".to_string(),
                primary: true,
                events: Vec::new(),
            }],
        }
    }

    fn calendar_mut(&mut self, id: &str) -> ProviderResult<&mut StoredCalendar> {
        self.calendars
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ProviderError::not_found(format!("calendar {id} not found")))
    }
}

/// A calendar store in a single JSON file.
#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ProviderResult<StoreDocument> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store missing, starting empty");
                return Ok(StoreDocument::with_primary());
            }
            Err(err) => {
                return Err(storage_error(
                    format!("failed to read {}", self.path.display()),
                    err,
                ));
            }
        };

        serde_json::from_str(&contents).map_err(|err| {
            ProviderError::invalid_data(format!("failed to parse {}", self.path.display()))
                .with_provider(NAME)
                .with_source(err)
        })
    }

    async fn save(&self, document: &StoreDocument) -> ProviderResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(|err| {
            ProviderError::internal("failed to serialize store")
                .with_provider(NAME)
                .with_source(err)
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                storage_error(format!("failed to create {}", parent.display()), err)
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|err| storage_error(format!("failed to write {}", tmp.display()), err))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|err| {
            storage_error(format!("failed to replace {}", self.path.display()), err)
        })?;
        Ok(())
    }
}

fn storage_error(message: String, err: std::io::Error) -> ProviderError {
    ProviderError::storage(message)
        .with_provider(NAME)
        .with_source(err)
}

impl CalendarProvider for FileProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            let document = self.load().await?;
            Ok(document.calendars.iter().map(StoredCalendar::info).collect())
        })
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        Box::pin(async move {
            let document = self.load().await?;
            let calendar_ids: Vec<String> = match &options.calendars {
                CalendarSelection::All => document.calendars.iter().map(|c| c.id.clone()).collect(),
                CalendarSelection::Ids(ids) => ids.clone(),
            };

            let per_calendar = calendar_ids
                .into_iter()
                .map(|id| {
                    let result = document
                        .calendars
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| c.events_in(&options))
                        .ok_or_else(|| {
                            ProviderError::not_found(format!("calendar {id} not found"))
                                .with_provider(NAME)
                        });
                    (id, result)
                })
                .collect();

            Ok(merge_calendar_events(NAME, per_calendar))
        })
    }

    fn create_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        Box::pin(async move {
            event
                .validate()
                .map_err(|e| ProviderError::bad_request(e.to_string()).with_provider(NAME))?;

            let _guard = self.lock.lock().await;
            let mut document = self.load().await?;
            let calendar_id = if event.calendar_id.is_empty() {
                PRIMARY_CALENDAR.to_string()
            } else {
                event.calendar_id.clone()
            };

            let id = uuid::Uuid::new_v4().simple().to_string();
            let raw = to_raw_event(&event, &id);
            document
                .calendar_mut(&calendar_id)
                .map_err(|e| e.with_provider(NAME))?
                .events
                .push(raw.clone());
            self.save(&document).await?;

            debug!(%id, calendar = %calendar_id, title = %event.title, "created event");
            Ok(normalize_event(&raw, &calendar_id).with_id(event.id))
        })
    }

    fn update_event(&self, event: Event) -> BoxFuture<'_, ProviderResult<Event>> {
        Box::pin(async move {
            let (calendar_id, id) = update_target(&event).map_err(|e| e.with_provider(NAME))?;
            event
                .validate()
                .map_err(|e| ProviderError::bad_request(e.to_string()).with_provider(NAME))?;

            let _guard = self.lock.lock().await;
            let mut document = self.load().await?;
            let calendar = document
                .calendar_mut(calendar_id)
                .map_err(|e| e.with_provider(NAME))?;
            let Some(stored) = calendar.events.iter_mut().find(|raw| raw.id == id) else {
                return Err(ProviderError::not_found(format!(
                    "event {id} not found in calendar {calendar_id}"
                ))
                .with_provider(NAME));
            };

            apply_changes(stored, &event);
            let raw = stored.clone();
            self.save(&document).await?;

            debug!(%id, calendar = %calendar_id, "updated event");
            Ok(normalize_event(&raw, calendar_id).with_id(event.id.clone()))
        })
    }
}
