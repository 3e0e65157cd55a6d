//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

/// Longest range `events` and `overlaps` accept, in days.
pub const MAX_DAYS: i64 = 3660;

/// slotplan - find room for meetings
#[derive(Debug, Parser)]
#[command(name = "slotplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SLOTPLAN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List events
    Events {
        /// First day to list (default: today)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Number of days to list
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_DAYS))]
        days: u32,
    },

    /// Show overlapping events
    Overlaps {
        /// First day to check (default: today)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Number of days to check
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_DAYS))]
        days: u32,
    },

    /// Show free time within working hours
    FreeSlots {
        /// Day to inspect (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Add a meeting, moving it if the requested time is taken
    Schedule {
        /// Meeting title
        #[arg(long)]
        title: String,

        /// Requested start, e.g. 2025-03-10T10:00
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,

        /// Requested end, e.g. 2025-03-10T11:00
        #[arg(long, value_parser = parse_datetime)]
        end: NaiveDateTime,

        /// Meeting description
        #[arg(long)]
        description: Option<String>,

        /// Attendee (can be repeated)
        #[arg(long = "attendee", action = clap::ArgAction::Append)]
        attendees: Vec<String>,

        /// Calendar to add the meeting to
        #[arg(long)]
        calendar: Option<String>,
    },

    /// Suggest new times for conflicting meetings
    Suggest {
        /// Day to replan (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Minutes between moved meetings (default: from config)
        #[arg(long)]
        buffer: Option<u32>,

        /// Write the suggested times back to the calendar
        #[arg(long)]
        apply: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{value}'"))
}

/// Parses `YYYY-MM-DDTHH:MM[:SS]`, also accepting a space for `T`.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_schedule() {
        let cli = Cli::try_parse_from([
            "slotplan",
            "--json",
            "schedule",
            "--title",
            "Review",
            "--start",
            "2025-03-10T10:00",
            "--end",
            "2025-03-10 11:00:00",
            "--attendee",
            "alice@example.com",
            "--attendee",
            "bob@example.com",
        ])
        .unwrap();

        assert!(cli.json);
        let Command::Schedule {
            title,
            start,
            end,
            attendees,
            description,
            calendar,
        } = cli.command
        else {
            panic!("expected schedule");
        };
        assert_eq!(title, "Review");
        assert_eq!(start, parse_datetime("2025-03-10T10:00:00").unwrap());
        assert_eq!((end - start).num_minutes(), 60);
        assert_eq!(attendees, vec!["alice@example.com", "bob@example.com"]);
        assert!(description.is_none());
        assert!(calendar.is_none());
    }

    #[test]
    fn parse_suggest_with_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "slotplan", "suggest", "--date", "2025-03-10", "--buffer", "10", "--apply", "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Command::Suggest {
                buffer: Some(10),
                apply: true,
                ..
            }
        ));
    }

    #[test]
    fn day_ranges_are_bounded() {
        let cli = Cli::try_parse_from(["slotplan", "events", "--days", "7"]).unwrap();
        assert!(matches!(cli.command, Command::Events { days: 7, .. }));

        for days in ["0", "3661", "4294967295"] {
            assert!(Cli::try_parse_from(["slotplan", "events", "--days", days]).is_err());
            assert!(Cli::try_parse_from(["slotplan", "overlaps", "--days", days]).is_err());
        }
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(parse_date("10/03/2025").is_err());
        assert!(parse_datetime("2025-03-10").is_err());
        assert!(
            Cli::try_parse_from(["slotplan", "free-slots", "--date", "tomorrow"]).is_err()
        );
    }
}
