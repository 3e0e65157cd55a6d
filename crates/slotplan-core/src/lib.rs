//! Scheduling engine: events, intervals, overlaps, free slots, rescheduling
//!
//! The engine is a set of pure functions over in-memory [`Event`] values:
//!
//! - [`overlap`]: detect pairwise overlaps between events
//! - [`freeslots`]: compute the uncovered parts of a working day
//! - [`planner`]: place a new event or re-place conflicting ones, falling
//!   back through increasingly permissive strategies
//!
//! Nothing in this crate performs I/O; fetching and persisting events is the
//! caller's job (see the `slotplan-providers` crate).

pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod freeslots;
pub mod overlap;
pub mod planner;
pub mod time;
pub mod tracing;

pub use config::PlannerConfig;
pub use error::{PlanError, PlanResult};
pub use event::{Event, PRIMARY_CALENDAR};
pub use format::{format_event_line, format_free_slot, format_free_slots, format_schedule};
pub use freeslots::find_free_slots;
pub use overlap::{Overlap, conflicting_events, find_overlaps};
pub use planner::{Attempt, Planner, RescheduleSuggestion, Strategy};
pub use time::{Slot, TimeWindow, WorkingHours};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
