//! slotplan CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use slotplan_core::{Planner, TracingConfig, init_tracing};
use slotplan_providers::FileProvider;

use slotplan_client::cli::{Cli, Command, ConfigAction};
use slotplan_client::commands;
use slotplan_client::config::ClientConfig;
use slotplan_client::error::ClientResult;
use slotplan_client::service::{MeetingRequest, SchedulingService};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        };
    }

    let planner = Planner::new(config.planner_config()?)?;
    let provider = FileProvider::new(config.store_path());
    let service =
        SchedulingService::new(provider, planner).with_calendars(config.calendar_selection());

    match cli.command {
        Command::Events { from, days } => commands::events::run(&service, from, days, cli.json).await,
        Command::Overlaps { from, days } => {
            commands::overlaps::run(&service, from, days, cli.json).await
        }
        Command::FreeSlots { date } => commands::free_slots::run(&service, date, cli.json).await,
        Command::Schedule {
            title,
            start,
            end,
            description,
            attendees,
            calendar,
        } => {
            let mut request = MeetingRequest::new(title, start, end).with_attendees(attendees);
            if let Some(description) = description {
                request = request.with_description(description);
            }
            if let Some(calendar) = calendar {
                request = request.with_calendar_id(calendar);
            }
            commands::schedule::run(&service, request, cli.json).await
        }
        Command::Suggest {
            date,
            buffer,
            apply,
        } => commands::suggest::run(&service, date, buffer, apply, cli.json).await,
        // Handled before the store is opened.
        Command::Config { .. } => Ok(()),
    }
}
