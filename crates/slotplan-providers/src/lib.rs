//! Calendar backends for slotplan.
//!
//! - [`CalendarProvider`]: the async trait every backend implements
//! - [`RawEvent`]: events as a backend stores them
//! - [`normalize_event`]: conversion into planner [`Event`](slotplan_core::Event)s
//! - [`FileProvider`]: a JSON file store, used by the CLI
//! - [`MemoryProvider`]: an in-process store with failure injection
//!
//! ```text
//!  calendar.json ──► FileProvider ─┐
//!                                  ├─ CalendarProvider ──► Vec<Event>
//!  Vec<Event> ────► MemoryProvider ┘
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod normalize;
pub mod provider;
pub mod raw_event;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use file::FileProvider;
pub use memory::MemoryProvider;
pub use normalize::{
    apply_changes, normalize_event, normalize_event_in, normalize_events, to_raw_event,
};
pub use provider::{
    BoxFuture, CalendarInfo, CalendarProvider, CalendarSelection, ErrorProvider, FetchOptions,
    merge_calendar_events, update_target,
};
pub use raw_event::{RawAttendee, RawEvent, RawEventTime};
