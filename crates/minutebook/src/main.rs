//! `minutes` - CLI for minutebook
//!
//! This binary provides the command-line interface for scheduling meetings,
//! running live sessions and producing minutes documents.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;

use minutebook::cli::{
    ActionCommand, AgendaCommand, AttendeesCommand, Cli, Command, ConfigCommand, DecisionCommand,
    EditMinutesCommand, ExportCommand, ListCommand, NewCommand, NoteCommand, OutputFormat,
    ReviewCommand, ShowCommand, SpeakerCommand,
};
use minutebook::editable::EditableList;
use minutebook::generation::{review_minutes, DraftState, GeminiClient};
use minutebook::lifecycle::{MeetingService, NewActionItem, NewDecision};
use minutebook::meeting::{Meeting, MeetingDraft};
use minutebook::session::LiveSession;
use minutebook::storage::SqliteStore;
use minutebook::templates::{default_template, find_template, MEETING_TEMPLATES};
use minutebook::{document, init_logging, mail, Config, Error};

type Service = MeetingService<SqliteStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("Failed to load configuration")?;

    // Commands that never touch the record store
    let command = match cli.command {
        Command::Templates => {
            handle_templates();
            return Ok(());
        }
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let db_path = config.database_path();
    let store = SqliteStore::open(&db_path, config.storage.slot.as_str())
        .with_context(|| format!("Failed to open record store at {}", db_path.display()))?;
    let service = MeetingService::new(store);

    match command {
        Command::New(cmd) => handle_new(&service, cmd),
        Command::List(cmd) => handle_list(&service, &cmd),
        Command::Show(cmd) => handle_show(&service, &cmd),
        Command::Open { meeting } => handle_open(&service, &meeting),
        Command::Select { meeting, item } => handle_select(&service, &meeting, &item),
        Command::Note(cmd) => handle_note(&service, &cmd),
        Command::Speaker(cmd) => handle_speaker(&service, &cmd),
        Command::Action(cmd) => handle_action(&service, cmd),
        Command::Decision(cmd) => handle_decision(&service, cmd),
        Command::Agenda(cmd) => handle_agenda(&service, cmd),
        Command::Attendees(cmd) => handle_attendees(&service, cmd),
        Command::End { meeting } => handle_end(&service, &meeting),
        Command::Review(cmd) => handle_review(&config, &service, &cmd).await,
        Command::EditMinutes(cmd) => handle_edit_minutes(&service, cmd),
        Command::Export(cmd) => handle_export(&config, &service, cmd),
        Command::Email { meeting } => {
            let meeting = service.get_meeting(&meeting)?;
            println!("{}", mail::mailto_link(&meeting)?);
            Ok(())
        }
        Command::Remove { meeting } => {
            let removed = service.remove_meeting(&meeting)?;
            println!("Removed meeting {} '{}'", removed.id, removed.title);
            Ok(())
        }
        Command::Status(cmd) => handle_status(&service, cmd.json),
        Command::Templates | Command::Config(_) => Ok(()),
    }
}

fn agenda_item_id(meeting: &Meeting, selector: &str) -> Result<String, Error> {
    meeting
        .find_agenda_item(selector)
        .map(|item| item.id.clone())
        .ok_or_else(|| Error::agenda_item_not_found(&meeting.id, selector))
}

fn attendee_id(meeting: &Meeting, selector: &str) -> Result<String, Error> {
    meeting
        .find_attendee(selector)
        .map(|attendee| attendee.id.clone())
        .ok_or_else(|| Error::attendee_not_found(&meeting.id, selector))
}

fn attendee_index(meeting: &Meeting, selector: &str) -> Result<usize, Error> {
    let id = attendee_id(meeting, selector)?;
    EditableList::from_slice(&meeting.attendees)
        .position(&id)
        .ok_or_else(|| Error::attendee_not_found(&meeting.id, selector))
}

fn agenda_index(meeting: &Meeting, selector: &str) -> Result<usize, Error> {
    let id = agenda_item_id(meeting, selector)?;
    EditableList::from_slice(&meeting.agenda)
        .position(&id)
        .ok_or_else(|| Error::agenda_item_not_found(&meeting.id, selector))
}

/// The agenda item a live entry is recorded against: the one named on the
/// command line, or the session's active item.
fn active_item_id(meeting: &Meeting, selector: Option<&str>) -> anyhow::Result<String> {
    if let Some(selector) = selector {
        return Ok(agenda_item_id(meeting, selector)?);
    }
    LiveSession::resume(meeting)
        .active_id()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Meeting {} has no agenda items", meeting.id))
}

fn handle_templates() {
    for template in MEETING_TEMPLATES {
        println!(
            "{} ({} items, {} min)",
            template.name,
            template.agenda.len(),
            template.total_minutes()
        );
        for (i, item) in template.agenda.iter().enumerate() {
            println!(
                "  {}. {} - {} ({} min)",
                i + 1,
                item.title,
                item.presenter,
                item.minutes
            );
        }
    }
}

fn handle_new(service: &Service, cmd: NewCommand) -> anyhow::Result<()> {
    let mut lines = cmd.attendees.join("\n");
    if let Some(path) = &cmd.attendees_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read attendees from {}", path.display()))?;
        lines.push('\n');
        lines.push_str(&contents);
    }

    let template = match cmd.template.as_deref() {
        Some(name) => find_template(name)?,
        None => default_template(),
    };

    let draft = MeetingDraft {
        title: cmd.title,
        date: cmd.date,
        start_time: cmd.time,
        location: cmd.location,
    };
    let meeting = service.create_meeting(draft, &lines, template)?;

    println!("Scheduled meeting {}", meeting.id);
    print_meeting(&meeting);
    Ok(())
}

fn handle_list(service: &Service, cmd: &ListCommand) -> anyhow::Result<()> {
    let meetings = service.list_meetings(cmd.search.as_deref())?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&meetings)?),
        OutputFormat::Plain => {
            for m in &meetings {
                println!(
                    "{} {} {} [{}] {}",
                    m.id,
                    m.date,
                    m.start_time.format("%H:%M"),
                    m.status,
                    m.title
                );
            }
        }
        OutputFormat::Table => {
            if meetings.is_empty() {
                println!("No meetings found.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<10}  {:<5}  {:<10}  TITLE",
                "ID", "DATE", "TIME", "STATUS"
            );
            for m in &meetings {
                println!(
                    "{:<36}  {:<10}  {:<5}  {:<10}  {}",
                    m.id,
                    m.date.to_string(),
                    m.start_time.format("%H:%M").to_string(),
                    m.status.to_string(),
                    m.title
                );
            }
        }
    }
    Ok(())
}

fn handle_show(service: &Service, cmd: &ShowCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    if cmd.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&meeting)?);
    } else {
        print_meeting(&meeting);
    }
    Ok(())
}

fn print_meeting(meeting: &Meeting) {
    println!("{}", meeting.title);
    println!("{}", "=".repeat(meeting.title.chars().count().max(3)));
    println!("Status:    {}", meeting.status);
    println!("Date:      {}", meeting.date.format("%a %b %d %Y"));
    match meeting.end_time {
        Some(end) => println!(
            "Time:      {} - {}",
            meeting.start_time.format("%H:%M"),
            end.format("%H:%M")
        ),
        None => println!("Time:      {}", meeting.start_time.format("%H:%M")),
    }
    println!("Location:  {}", meeting.location);

    println!();
    println!("Attendees:");
    for (i, a) in meeting.attendees.iter().enumerate() {
        if a.email.is_empty() {
            println!("  {}. {} ({})", i + 1, a.name, a.status.label());
        } else {
            println!("  {}. {} <{}> ({})", i + 1, a.name, a.email, a.status.label());
        }
    }

    println!();
    println!("Agenda:");
    for (i, item) in meeting.agenda.iter().enumerate() {
        println!(
            "  {}. {} - {} ({} min)",
            i + 1,
            item.title,
            item.presenter,
            item.time_allocation
        );
        for line in item.notes.lines().filter(|l| !l.trim().is_empty()) {
            println!("       {line}");
        }
        for d in meeting.decisions_for(&item.id) {
            println!(
                "       Decision: {} (moved {}, seconded {}) - {}",
                d.motion,
                meeting.attendee_name(&d.mover_id),
                meeting.attendee_name(&d.seconder_id),
                d.outcome.label()
            );
        }
        for a in meeting.action_items_for(&item.id) {
            let due = a
                .due_date
                .map_or_else(|| "no due date".to_string(), |d| format!("due {d}"));
            println!(
                "       Action: {} ({}, {due})",
                a.description,
                meeting.attendee_name(&a.owner_id)
            );
        }
    }

    if let Some(record) = &meeting.minutes {
        let state = if meeting.minutes_are_current() {
            "current"
        } else {
            "stale"
        };
        println!();
        println!(
            "Minutes:   generated {} ({state}{})",
            record.generated_at.format("%Y-%m-%d %H:%M"),
            if record.edited { ", edited" } else { "" }
        );
    }
}

fn handle_open(service: &Service, meeting_id: &str) -> anyhow::Result<()> {
    let meeting = service.open_for_session(meeting_id)?;
    print_session(&meeting);
    Ok(())
}

fn handle_select(service: &Service, meeting_id: &str, selector: &str) -> anyhow::Result<()> {
    let meeting = service.get_meeting(meeting_id)?;
    let item_id = agenda_item_id(&meeting, selector)?;
    let updated = service.select_agenda_item(meeting_id, &item_id)?;
    print_session(&updated);
    Ok(())
}

fn print_session(meeting: &Meeting) {
    let session = LiveSession::resume(meeting);

    println!("{} is {}", meeting.title, meeting.status);
    for (i, item) in meeting.agenda.iter().enumerate() {
        let marker = if session.active_id() == Some(item.id.as_str()) {
            ">"
        } else {
            " "
        };
        println!("{marker} {}. {} ({} min)", i + 1, item.title, item.time_allocation);
    }
}

fn handle_note(service: &Service, cmd: &NoteCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    let item_id = agenda_item_id(&meeting, &cmd.item)?;

    let updated = if cmd.replace {
        service.set_notes(&cmd.meeting, &item_id, &cmd.text)?
    } else {
        service.append_note(&cmd.meeting, &item_id, &cmd.text)?
    };

    if let Some(item) = updated.agenda_item(&item_id) {
        println!("{}", item.notes);
    }
    Ok(())
}

fn handle_speaker(service: &Service, cmd: &SpeakerCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    let item_id = agenda_item_id(&meeting, &cmd.item)?;
    let attendee = attendee_id(&meeting, &cmd.attendee)?;

    let updated = service.record_speaker(&cmd.meeting, &item_id, &attendee)?;
    if let Some(item) = updated.agenda_item(&item_id) {
        println!("{}", item.notes);
    }
    Ok(())
}

fn handle_action(service: &Service, cmd: ActionCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    let item_id = active_item_id(&meeting, cmd.item.as_deref())?;
    let owner_id = attendee_id(&meeting, &cmd.owner)?;

    let action = service.log_action_item(
        &cmd.meeting,
        &item_id,
        NewActionItem {
            description: cmd.description,
            owner_id,
            due_date: cmd.due,
        },
    )?;
    println!("Logged action item {}", action.id);
    Ok(())
}

fn handle_decision(service: &Service, cmd: DecisionCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    let item_id = active_item_id(&meeting, cmd.item.as_deref())?;
    let mover_id = attendee_id(&meeting, &cmd.mover)?;
    let seconder_id = attendee_id(&meeting, &cmd.seconder)?;

    let decision = service.log_decision(
        &cmd.meeting,
        &item_id,
        NewDecision {
            motion: cmd.motion,
            mover_id,
            seconder_id,
            outcome: cmd.outcome.into(),
        },
    )?;
    println!("Logged decision {} ({})", decision.id, decision.outcome);
    Ok(())
}

fn handle_agenda(service: &Service, cmd: AgendaCommand) -> anyhow::Result<()> {
    let (meeting_id, agenda) = match cmd {
        AgendaCommand::Add {
            meeting,
            title,
            presenter,
            minutes,
        } => {
            let current = service.get_meeting(&meeting)?;
            let mut list = EditableList::from_slice(&current.agenda);
            let item = list.add();
            item.title = title;
            item.presenter = presenter;
            item.time_allocation = minutes;
            (meeting, list.into_entries())
        }
        AgendaCommand::Remove { meeting, item } => {
            let current = service.get_meeting(&meeting)?;
            let index = agenda_index(&current, &item)?;
            let mut list = EditableList::from_slice(&current.agenda);
            list.remove(index)?;
            (meeting, list.into_entries())
        }
        AgendaCommand::Set {
            meeting,
            item,
            title,
            presenter,
            minutes,
        } => {
            let current = service.get_meeting(&meeting)?;
            let index = agenda_index(&current, &item)?;
            let mut list = EditableList::from_slice(&current.agenda);
            list.update(index, |entry| {
                if let Some(title) = title {
                    entry.title = title;
                }
                if let Some(presenter) = presenter {
                    entry.presenter = presenter;
                }
                if let Some(minutes) = minutes {
                    entry.time_allocation = minutes;
                }
            })?;
            (meeting, list.into_entries())
        }
    };

    let updated = service.replace_agenda(&meeting_id, agenda)?;
    for (i, item) in updated.agenda.iter().enumerate() {
        println!(
            "{}. {} - {} ({} min)",
            i + 1,
            item.title,
            item.presenter,
            item.time_allocation
        );
    }
    Ok(())
}

fn handle_attendees(service: &Service, cmd: AttendeesCommand) -> anyhow::Result<()> {
    let (meeting_id, attendees) = match cmd {
        AttendeesCommand::Add {
            meeting,
            name,
            email,
            status,
        } => {
            let current = service.get_meeting(&meeting)?;
            let mut list = EditableList::from_slice(&current.attendees);
            let attendee = list.add();
            attendee.name = name.trim().to_string();
            attendee.email = email.trim().to_string();
            attendee.status = status.into();
            (meeting, list.into_entries())
        }
        AttendeesCommand::Remove { meeting, attendee } => {
            let current = service.get_meeting(&meeting)?;
            let index = attendee_index(&current, &attendee)?;
            let mut list = EditableList::from_slice(&current.attendees);
            list.remove(index)?;
            (meeting, list.into_entries())
        }
        AttendeesCommand::Set {
            meeting,
            attendee,
            name,
            email,
            status,
        } => {
            let current = service.get_meeting(&meeting)?;
            let index = attendee_index(&current, &attendee)?;
            let mut list = EditableList::from_slice(&current.attendees);
            list.update(index, |entry| {
                if let Some(name) = name {
                    entry.name = name.trim().to_string();
                }
                if let Some(email) = email {
                    entry.email = email.trim().to_string();
                }
                if let Some(status) = status {
                    entry.status = status.into();
                }
            })?;
            (meeting, list.into_entries())
        }
    };

    let updated = service.replace_attendees(&meeting_id, attendees)?;
    for (i, a) in updated.attendees.iter().enumerate() {
        println!("{}. {} <{}> ({})", i + 1, a.name, a.email, a.status.label());
    }
    Ok(())
}

fn handle_end(service: &Service, meeting_id: &str) -> anyhow::Result<()> {
    let meeting = service.end_meeting(meeting_id)?;
    let end = meeting
        .end_time
        .map_or_else(|| "N/A".to_string(), |t| t.format("%H:%M").to_string());
    println!("Ended {} at {end}", meeting.title);
    println!("Run `minutes review {}` to draft the minutes.", meeting.id);
    Ok(())
}

async fn handle_review(
    config: &Config,
    service: &Service,
    cmd: &ReviewCommand,
) -> anyhow::Result<()> {
    let generator = GeminiClient::from_config(&config.generation)
        .context("Failed to set up the generation client")?;
    let review = review_minutes(service, &generator, &cmd.meeting, cmd.force).await?;

    match &review.draft {
        DraftState::Ready(text) => {
            println!("{text}");
            if review.regenerated {
                eprintln!("Minutes generated and stored for {}.", review.meeting.id);
            }
        }
        DraftState::Failed(message) => {
            eprintln!("{message}");
            eprintln!("Export and email stay disabled until minutes are generated.");
        }
    }
    Ok(())
}

fn handle_edit_minutes(service: &Service, cmd: EditMinutesCommand) -> anyhow::Result<()> {
    let text = match &cmd.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read minutes from {}", path.display()))?,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
    };

    let meeting = service.edit_minutes(&cmd.meeting, text)?;
    println!("Updated minutes for {}", meeting.id);
    Ok(())
}

fn handle_export(config: &Config, service: &Service, cmd: ExportCommand) -> anyhow::Result<()> {
    let meeting = service.get_meeting(&cmd.meeting)?;
    let page_size = cmd
        .page_size
        .map_or(config.export.page_size, Into::into);
    let dir: PathBuf = cmd.output.unwrap_or_else(|| config.output_dir());

    let path = document::export_pdf(&meeting, page_size, &dir)?;
    println!("Exported minutes to {}", path.display());
    Ok(())
}

fn handle_status(service: &Service, json: bool) -> anyhow::Result<()> {
    let store = service.store();
    let stats = store.stats()?;
    let meetings = service.list_meetings(None)?;

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "slot": store.slot(),
            "meetings": meetings.len(),
            "slot_bytes": stats.slot_bytes,
            "db_size_bytes": stats.db_size_bytes,
            "last_write": stats.last_write,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("minutes status");
        println!("--------------");
        println!("Database:      {}", store.path().display());
        println!("Slot:          {}", store.slot());
        println!("Meetings:      {}", meetings.len());
        println!("Slot size:     {} bytes", stats.slot_bytes);
        println!("Database size: {} bytes", stats.db_size_bytes);
        match stats.last_write {
            Some(at) => println!("Last write:    {}", at.to_rfc3339()),
            None => println!("Last write:    never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", shown.database_path().display());
                println!("  Slot:           {}", shown.storage.slot);
                println!();
                println!("[Generation]");
                println!(
                    "  API key:        {}",
                    shown.generation.api_key.as_deref().unwrap_or("(not set)")
                );
                println!("  Model:          {}", shown.generation.model);
                println!("  Endpoint:       {}", shown.generation.endpoint);
                println!("  Timeout (s):    {}", shown.generation.timeout_secs);
                println!("  Max retries:    {}", shown.generation.max_retries);
                println!("  Retry base (ms): {}", shown.generation.retry_base_ms);
                println!();
                println!("[Export]");
                println!("  Page size:      {}", shown.export.page_size);
                println!("  Output dir:     {}", shown.output_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
