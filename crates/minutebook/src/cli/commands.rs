//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand, ValueEnum};

use crate::document::PageSize;
use crate::meeting::{parse_clock_time, AttendeeStatus, Outcome};

/// Parse a calendar date written as `YYYY-MM-DD`.
fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected a date like 2025-03-14, got '{}'", value.trim()))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    parse_clock_time(value)
}

/// New meeting arguments.
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Meeting title
    pub title: String,

    /// Meeting date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Start time (HH:MM)
    #[arg(short, long, value_parser = parse_time)]
    pub time: NaiveTime,

    /// Where the meeting takes place
    #[arg(short, long, default_value = "")]
    pub location: String,

    /// Attendee as "Name, Email" (repeatable)
    #[arg(short, long = "attendee", value_name = "NAME, EMAIL")]
    pub attendees: Vec<String>,

    /// File with one "Name, Email" attendee per line
    #[arg(long, value_name = "FILE")]
    pub attendees_file: Option<PathBuf>,

    /// Agenda template (see `minutes templates`)
    #[arg(long)]
    pub template: Option<String>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show meetings whose title contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Meeting id
    pub meeting: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Note command arguments.
#[derive(Debug, Args)]
pub struct NoteCommand {
    /// Meeting id
    pub meeting: String,

    /// Agenda item (1-based position or id)
    pub item: String,

    /// Text to record
    pub text: String,

    /// Replace the item's notes instead of appending
    #[arg(long)]
    pub replace: bool,
}

/// Speaker command arguments.
#[derive(Debug, Args)]
pub struct SpeakerCommand {
    /// Meeting id
    pub meeting: String,

    /// Agenda item (1-based position or id)
    pub item: String,

    /// Attendee (1-based position, id, or name)
    pub attendee: String,
}

/// Action item arguments.
#[derive(Debug, Args)]
pub struct ActionCommand {
    /// Meeting id
    pub meeting: String,

    /// What needs to be done
    pub description: String,

    /// Attendee who owns the task (1-based position, id, or name)
    #[arg(short, long)]
    pub owner: String,

    /// Due date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub due: Option<NaiveDate>,

    /// Agenda item the task came from; defaults to the active item
    #[arg(short, long)]
    pub item: Option<String>,
}

/// Decision arguments.
#[derive(Debug, Args)]
pub struct DecisionCommand {
    /// Meeting id
    pub meeting: String,

    /// Motion text
    pub motion: String,

    /// Attendee who moved the motion
    #[arg(short, long)]
    pub mover: String,

    /// Attendee who seconded the motion
    #[arg(short, long)]
    pub seconder: String,

    /// Result of the vote
    #[arg(short, long, value_enum, default_value = "carried")]
    pub outcome: OutcomeArg,

    /// Agenda item the decision belongs to; defaults to the active item
    #[arg(short, long)]
    pub item: Option<String>,
}

/// Agenda editing commands.
#[derive(Debug, Subcommand)]
pub enum AgendaCommand {
    /// Append an agenda item
    Add {
        /// Meeting id
        meeting: String,
        /// Item title
        title: String,
        /// Who presents the item
        #[arg(short, long, default_value = "")]
        presenter: String,
        /// Time allocation in minutes
        #[arg(short, long, default_value = "10")]
        minutes: u32,
    },

    /// Remove an agenda item
    Remove {
        /// Meeting id
        meeting: String,
        /// Agenda item (1-based position or id)
        item: String,
    },

    /// Change an agenda item's fields
    Set {
        /// Meeting id
        meeting: String,
        /// Agenda item (1-based position or id)
        item: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New presenter
        #[arg(short, long)]
        presenter: Option<String>,
        /// New time allocation in minutes
        #[arg(short, long)]
        minutes: Option<u32>,
    },
}

/// Attendee editing commands.
#[derive(Debug, Subcommand)]
pub enum AttendeesCommand {
    /// Add an attendee
    Add {
        /// Meeting id
        meeting: String,
        /// Display name
        name: String,
        /// Email address
        #[arg(short, long, default_value = "")]
        email: String,
        /// Attendance status
        #[arg(short, long, value_enum, default_value = "present")]
        status: AttendeeStatusArg,
    },

    /// Remove an attendee
    Remove {
        /// Meeting id
        meeting: String,
        /// Attendee (1-based position, id, or name)
        attendee: String,
    },

    /// Change an attendee's fields
    Set {
        /// Meeting id
        meeting: String,
        /// Attendee (1-based position, id, or name)
        attendee: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New email address
        #[arg(short, long)]
        email: Option<String>,
        /// New attendance status
        #[arg(short, long, value_enum)]
        status: Option<AttendeeStatusArg>,
    },
}

/// Review command arguments.
#[derive(Debug, Args)]
pub struct ReviewCommand {
    /// Meeting id
    pub meeting: String,

    /// Generate new minutes even if the stored ones are current
    #[arg(short, long)]
    pub force: bool,
}

/// Edit-minutes command arguments.
#[derive(Debug, Args)]
pub struct EditMinutesCommand {
    /// Meeting id
    pub meeting: String,

    /// File holding the new minutes text; reads stdin when omitted
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Meeting id
    pub meeting: String,

    /// Directory to write the PDF to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Paper size (defaults to the configured size)
    #[arg(short, long, value_enum)]
    pub page_size: Option<PageSizeArg>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Decision outcome argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutcomeArg {
    /// The motion passed
    Carried,
    /// The motion failed
    Defeated,
    /// The motion was postponed
    Tabled,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Carried => Self::Carried,
            OutcomeArg::Defeated => Self::Defeated,
            OutcomeArg::Tabled => Self::Tabled,
        }
    }
}

/// Attendance status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttendeeStatusArg {
    /// Attended
    Present,
    /// Did not attend
    Absent,
    /// Attended as a guest
    Guest,
}

impl From<AttendeeStatusArg> for AttendeeStatus {
    fn from(arg: AttendeeStatusArg) -> Self {
        match arg {
            AttendeeStatusArg::Present => Self::Present,
            AttendeeStatusArg::Absent => Self::Absent,
            AttendeeStatusArg::Guest => Self::Guest,
        }
    }
}

/// Paper size argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageSizeArg {
    /// ISO A4
    A4,
    /// US Letter
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => Self::A4,
            PageSizeArg::Letter => Self::Letter,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-14").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        assert!(parse_date("14/03/2025").unwrap_err().contains("2025-03-14"));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time("half past nine").is_err());
    }

    #[test]
    fn test_outcome_arg_conversion() {
        assert_eq!(Outcome::from(OutcomeArg::Carried), Outcome::Carried);
        assert_eq!(Outcome::from(OutcomeArg::Defeated), Outcome::Defeated);
        assert_eq!(Outcome::from(OutcomeArg::Tabled), Outcome::Tabled);
    }

    #[test]
    fn test_attendee_status_arg_conversion() {
        assert_eq!(
            AttendeeStatus::from(AttendeeStatusArg::Present),
            AttendeeStatus::Present
        );
        assert_eq!(
            AttendeeStatus::from(AttendeeStatusArg::Absent),
            AttendeeStatus::Absent
        );
        assert_eq!(
            AttendeeStatus::from(AttendeeStatusArg::Guest),
            AttendeeStatus::Guest
        );
    }

    #[test]
    fn test_page_size_arg_conversion() {
        assert_eq!(PageSize::from(PageSizeArg::A4), PageSize::A4);
        assert_eq!(PageSize::from(PageSizeArg::Letter), PageSize::Letter);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
