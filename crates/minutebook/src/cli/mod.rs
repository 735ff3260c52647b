//! Command-line interface for minutebook.
//!
//! This module provides the CLI structure and command handlers for the
//! `minutes` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ActionCommand, AgendaCommand, AttendeeStatusArg, AttendeesCommand, ConfigCommand,
    DecisionCommand, EditMinutesCommand, ExportCommand, ListCommand, NewCommand, NoteCommand,
    OutcomeArg, OutputFormat, PageSizeArg, ReviewCommand, ShowCommand, SpeakerCommand,
    StatusCommand,
};

/// minutes - Schedule meetings, take notes live, and produce minutes
///
/// Meetings move from scheduled to in progress to completed. Notes, action
/// items and decisions are recorded during the session; afterwards the
/// minutes are drafted by a text-generation service and exported as PDF.
#[derive(Debug, Parser)]
#[command(name = "minutes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Schedule a new meeting
    New(NewCommand),

    /// List meetings, newest first
    List(ListCommand),

    /// Show one meeting
    Show(ShowCommand),

    /// Start (or resume) the live session of a meeting
    Open {
        /// Meeting id
        meeting: String,
    },

    /// Make an agenda item the active one in the live session
    Select {
        /// Meeting id
        meeting: String,
        /// Agenda item (1-based position or id)
        item: String,
    },

    /// Add to an agenda item's notes
    Note(NoteCommand),

    /// Stamp a speaker into an agenda item's notes
    Speaker(SpeakerCommand),

    /// Log an action item
    Action(ActionCommand),

    /// Log a decision
    Decision(DecisionCommand),

    /// Edit a meeting's agenda
    #[command(subcommand)]
    Agenda(AgendaCommand),

    /// Edit a meeting's attendees
    #[command(subcommand)]
    Attendees(AttendeesCommand),

    /// End the live session
    End {
        /// Meeting id
        meeting: String,
    },

    /// Draft (or show) the minutes of a meeting
    Review(ReviewCommand),

    /// Replace the stored minutes text
    EditMinutes(EditMinutesCommand),

    /// Export the minutes as PDF
    Export(ExportCommand),

    /// Print a mailto: link carrying the minutes
    Email {
        /// Meeting id
        meeting: String,
    },

    /// List the built-in agenda templates
    Templates,

    /// Delete a meeting
    Remove {
        /// Meeting id
        meeting: String,
    },

    /// Show record store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Templates,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "minutes");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(2, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new() {
        let args = vec![
            "minutes",
            "new",
            "Q2 Board",
            "--date",
            "2025-06-12",
            "--time",
            "18:30",
            "-a",
            "Ann, ann@x.com",
            "-a",
            "Bob",
            "--template",
            "Blank Meeting",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::New(cmd) = cli.command else {
            panic!("expected new command");
        };
        assert_eq!(cmd.title, "Q2 Board");
        assert_eq!(cmd.date.to_string(), "2025-06-12");
        assert_eq!(cmd.time.to_string(), "18:30:00");
        assert_eq!(cmd.attendees, vec!["Ann, ann@x.com", "Bob"]);
        assert_eq!(cmd.template.as_deref(), Some("Blank Meeting"));
        assert_eq!(cmd.location, "");
    }

    #[test]
    fn test_parse_new_rejects_bad_date() {
        let args = vec!["minutes", "new", "X", "-d", "12/06/2025", "-t", "10:00"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_select() {
        let args = vec!["minutes", "select", "m-1", "3"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Select { ref meeting, ref item } if meeting == "m-1" && item == "3"
        ));
    }

    #[test]
    fn test_parse_note_replace() {
        let args = vec!["minutes", "note", "m-1", "2", "Budget approved", "--replace"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Note(cmd) = cli.command else {
            panic!("expected note command");
        };
        assert_eq!(cmd.item, "2");
        assert!(cmd.replace);
    }

    #[test]
    fn test_parse_decision() {
        let args = vec![
            "minutes", "decision", "m-1", "Adopt budget", "-m", "Ann", "-s", "Bob", "-o",
            "tabled",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Decision(cmd) = cli.command else {
            panic!("expected decision command");
        };
        assert_eq!(cmd.outcome, OutcomeArg::Tabled);
        assert!(cmd.item.is_none());
    }

    #[test]
    fn test_parse_agenda_set() {
        let args = vec!["minutes", "agenda", "set", "m-1", "3", "--minutes", "25"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Agenda(AgendaCommand::Set {
                minutes: Some(25),
                title: None,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_attendees_add() {
        let args = vec!["minutes", "attendees", "add", "m-1", "Cy", "-s", "guest"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Command::Attendees(AttendeesCommand::Add {
                status: AttendeeStatusArg::Guest,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_export() {
        let args = vec!["minutes", "export", "m-1", "-p", "letter", "-o", "/tmp"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Export(cmd) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(cmd.page_size, Some(PageSizeArg::Letter));
        assert_eq!(cmd.output, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_parse_review_force() {
        let args = vec!["minutes", "review", "m-1", "--force"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Command::Review(ReviewCommand { force: true, .. })));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["minutes", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["minutes", "-vv", "templates"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let args = vec!["minutes", "list", "-q"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.quiet);
    }
}
