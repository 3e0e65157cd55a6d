//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/slotplan/config.toml` by default:
//!
//! ```toml
//! [planner]
//! work_start = "09:00"
//! work_end = "17:00"
//! overflow_gap_minutes = 5
//! buffer_minutes = 15
//!
//! [store]
//! path = "/home/me/.local/share/slotplan/calendar.json"
//! all_calendars = true
//! ```

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use slotplan_core::{PlannerConfig, WorkingHours};
use slotplan_providers::CalendarSelection;

use crate::error::{ClientError, ClientResult};

const TIME_FORMAT: &str = "%H:%M";

/// Configuration for the slotplan client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub planner: PlannerSettings,

    pub store: StoreSettings,
}

/// Working day and spacing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Start of the working day, `HH:MM`.
    pub work_start: String,

    /// End of the working day, `HH:MM`.
    pub work_end: String,

    /// Gap after the last event when a new meeting fits nowhere.
    pub overflow_gap_minutes: i64,

    /// Default buffer between rescheduled meetings.
    pub buffer_minutes: i64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            work_start: "09:00".to_string(),
            work_end: "17:00".to_string(),
            overflow_gap_minutes: 5,
            buffer_minutes: 15,
        }
    }
}

/// Calendar store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the JSON calendar store. Defaults to the data directory.
    pub path: Option<PathBuf>,

    /// Read every calendar in the store.
    pub all_calendars: bool,

    /// Calendars to read when `all_calendars` is off.
    pub calendar_ids: Vec<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            all_calendars: true,
            calendar_ids: vec![slotplan_core::PRIMARY_CALENDAR.to_string()],
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotplan")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotplan")
    }

    /// Returns the calendar store path.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("calendar.json"))
    }

    /// Returns which calendars commands read.
    pub fn calendar_selection(&self) -> CalendarSelection {
        if self.store.all_calendars {
            CalendarSelection::All
        } else {
            CalendarSelection::Ids(self.store.calendar_ids.clone())
        }
    }

    /// Converts the `[planner]` section, validating it.
    pub fn planner_config(&self) -> ClientResult<PlannerConfig> {
        let settings = &self.planner;
        let start = parse_clock("work_start", &settings.work_start)?;
        let end = parse_clock("work_end", &settings.work_end)?;
        let hours = WorkingHours::new(start, end)?;

        let config = PlannerConfig::default()
            .with_working_hours(hours)
            .with_overflow_gap(Duration::minutes(settings.overflow_gap_minutes))
            .with_default_buffer(Duration::minutes(settings.buffer_minutes));
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    pub fn validate(&self) -> ClientResult<()> {
        self.planner_config()?;
        if !self.store.all_calendars && self.store.calendar_ids.is_empty() {
            return Err(ClientError::Config(
                "store.calendar_ids must not be empty when all_calendars is false".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_clock(field: &str, value: &str) -> ClientResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        ClientError::Config(format!("planner.{field} must be HH:MM, got '{value}'"))
    })
}
