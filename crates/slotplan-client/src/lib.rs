//! CLI, configuration and scheduling service
//!
//! This crate provides the `slotplan` command-line interface on top of a
//! JSON calendar store.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod service;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use service::{
    MeetingRequest, PersistFailure, PersistReport, ScheduleOutcome, SchedulingService,
    SuggestOutcome,
};
