//! Core meeting record types.
//!
//! A [`Meeting`] owns its attendees, agenda, action items and decisions.
//! Cross-references (owner, mover, seconder, originating agenda item) are
//! plain identifiers scoped to the same meeting; lookups that miss fall back
//! to [`UNKNOWN_ATTENDEE`] instead of failing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used when an attendee reference no longer resolves.
pub const UNKNOWN_ATTENDEE: &str = "Unknown";

/// Generate a fresh identifier with the given prefix (`m`, `att`, `agenda`, ...).
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns a message describing the expected format when neither form parses.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("expected a time like 14:30, got '{value}'"))
}

/// Attendance status of a meeting participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    /// Attended the meeting.
    #[default]
    Present,
    /// Sent apologies or did not attend.
    Absent,
    /// Attended without being a member.
    Guest,
}

impl AttendeeStatus {
    /// Capitalized label used in rendered documents.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Guest => "Guest",
        }
    }
}

impl std::fmt::Display for AttendeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

/// Outcome of a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The motion passed.
    #[default]
    Carried,
    /// The motion failed.
    Defeated,
    /// The motion was deferred.
    Tabled,
}

impl Outcome {
    /// Capitalized label used in rendered documents.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Carried => "Carried",
            Self::Defeated => "Defeated",
            Self::Tabled => "Tabled",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Carried => write!(f, "carried"),
            Self::Defeated => write!(f, "defeated"),
            Self::Tabled => write!(f, "tabled"),
        }
    }
}

/// Lifecycle status of a meeting.
///
/// Status only moves forward: `scheduled → inprogress → completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeetingStatus {
    /// Created but not yet opened for a live session.
    #[default]
    #[serde(rename = "scheduled")]
    Scheduled,
    /// Live session running.
    #[serde(rename = "inprogress")]
    InProgress,
    /// Session ended; minutes may be generated.
    #[serde(rename = "completed")]
    Completed,
}

impl MeetingStatus {
    /// Whether moving from `self` to `next` is a legal single step.
    ///
    /// Staying in the same status is always allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Scheduled | Self::InProgress)
                | (Self::InProgress, Self::InProgress | Self::Completed)
                | (Self::Completed, Self::Completed)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::InProgress => write!(f, "inprogress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A meeting participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Identifier, unique within the meeting.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address (may be empty).
    pub email: String,
    /// Attendance status.
    pub status: AttendeeStatus,
}

impl Attendee {
    /// Create a present attendee with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: new_id("att"),
            name: name.into(),
            email: email.into(),
            status: AttendeeStatus::Present,
        }
    }
}

/// One item of a meeting agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    /// Identifier, unique within the meeting.
    pub id: String,
    /// Item title.
    pub title: String,
    /// Who presents the item.
    pub presenter: String,
    /// Time allocation in minutes.
    pub time_allocation: u32,
    /// Free-text notes accumulated during the session.
    #[serde(default)]
    pub notes: String,
}

impl AgendaItem {
    /// Create an agenda item with a fresh identifier and empty notes.
    #[must_use]
    pub fn new(title: impl Into<String>, presenter: impl Into<String>, minutes: u32) -> Self {
        Self {
            id: new_id("agenda"),
            title: title.into(),
            presenter: presenter.into(),
            time_allocation: minutes,
            notes: String::new(),
        }
    }

    /// Whether any notes were recorded.
    #[must_use]
    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// A task assigned during the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// Identifier, unique within the meeting.
    pub id: String,
    /// What needs to be done.
    pub description: String,
    /// Attendee id of the owner.
    pub owner_id: String,
    /// When the task is due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Agenda item during which the task was logged.
    pub agenda_item_id: String,
}

/// A motion put to the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Identifier, unique within the meeting.
    pub id: String,
    /// Motion text.
    pub motion: String,
    /// Attendee id of the mover.
    pub mover_id: String,
    /// Attendee id of the seconder.
    pub seconder_id: String,
    /// Result of the vote.
    pub outcome: Outcome,
    /// Agenda item during which the decision was logged.
    pub agenda_item_id: String,
}

/// Generated minutes text stored alongside the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutesRecord {
    /// Markdown minutes as returned by the generator (possibly hand-edited).
    pub text: String,
    /// When the text was generated.
    pub generated_at: NaiveDateTime,
    /// Digest of the meeting content the text was generated from.
    pub source_digest: String,
    /// Whether the text was edited by hand after generation.
    #[serde(default)]
    pub edited: bool,
}

/// Fields supplied by the user when scheduling a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDraft {
    /// Meeting title.
    pub title: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Scheduled start time.
    pub start_time: NaiveTime,
    /// Where the meeting takes place.
    pub location: String,
}

/// A meeting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Identifier, unique within the record store.
    pub id: String,
    /// Meeting title.
    pub title: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Scheduled start time.
    pub start_time: NaiveTime,
    /// Stamped when the meeting is ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    /// Where the meeting takes place.
    pub location: String,
    /// Participants, in entry order.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Agenda, in running order.
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
    /// Tasks logged during the session.
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    /// Motions logged during the session.
    #[serde(default)]
    pub decisions: Vec<Decision>,
    /// Lifecycle status.
    pub status: MeetingStatus,
    /// Last generated minutes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<MinutesRecord>,
    /// Agenda item the live session is working on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item: Option<String>,
}

/// The content that minutes are derived from; excludes status and the minutes themselves.
#[derive(Serialize)]
struct DigestView<'a> {
    title: &'a str,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: Option<NaiveTime>,
    location: &'a str,
    attendees: &'a [Attendee],
    agenda: &'a [AgendaItem],
    action_items: &'a [ActionItem],
    decisions: &'a [Decision],
}

impl Meeting {
    /// Create a scheduled meeting with a fresh identifier.
    #[must_use]
    pub fn new(draft: MeetingDraft, attendees: Vec<Attendee>, agenda: Vec<AgendaItem>) -> Self {
        Self {
            id: new_id("m"),
            title: draft.title,
            date: draft.date,
            start_time: draft.start_time,
            end_time: None,
            location: draft.location,
            attendees,
            agenda,
            action_items: Vec::new(),
            decisions: Vec::new(),
            status: MeetingStatus::Scheduled,
            minutes: None,
            active_item: None,
        }
    }

    /// Look up an attendee by id.
    #[must_use]
    pub fn attendee(&self, id: &str) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.id == id)
    }

    /// Resolve an attendee id to a display name, falling back to [`UNKNOWN_ATTENDEE`].
    #[must_use]
    pub fn attendee_name(&self, id: &str) -> &str {
        self.attendee(id).map_or(UNKNOWN_ATTENDEE, |a| a.name.as_str())
    }

    /// Look up an agenda item by id.
    #[must_use]
    pub fn agenda_item(&self, id: &str) -> Option<&AgendaItem> {
        self.agenda.iter().find(|item| item.id == id)
    }

    /// Mutable lookup of an agenda item by id.
    pub fn agenda_item_mut(&mut self, id: &str) -> Option<&mut AgendaItem> {
        self.agenda.iter_mut().find(|item| item.id == id)
    }

    /// Resolve a user-supplied agenda reference: a 1-based position or an id.
    #[must_use]
    pub fn find_agenda_item(&self, selector: &str) -> Option<&AgendaItem> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|index| self.agenda.get(index));
        }
        self.agenda_item(selector)
    }

    /// Resolve a user-supplied attendee reference: a 1-based position, an id,
    /// or a case-insensitive name.
    #[must_use]
    pub fn find_attendee(&self, selector: &str) -> Option<&Attendee> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|index| self.attendees.get(index));
        }
        self.attendee(selector).or_else(|| {
            self.attendees
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(selector))
        })
    }

    /// Action items logged against the given agenda item.
    pub fn action_items_for<'a>(
        &'a self,
        agenda_item_id: &'a str,
    ) -> impl Iterator<Item = &'a ActionItem> + 'a {
        self.action_items
            .iter()
            .filter(move |a| a.agenda_item_id == agenda_item_id)
    }

    /// Decisions logged against the given agenda item.
    pub fn decisions_for<'a>(
        &'a self,
        agenda_item_id: &'a str,
    ) -> impl Iterator<Item = &'a Decision> + 'a {
        self.decisions
            .iter()
            .filter(move |d| d.agenda_item_id == agenda_item_id)
    }

    /// BLAKE3 digest of the content minutes are generated from.
    #[must_use]
    pub fn content_digest(&self) -> String {
        let view = DigestView {
            title: &self.title,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: &self.location,
            attendees: &self.attendees,
            agenda: &self.agenda,
            action_items: &self.action_items,
            decisions: &self.decisions,
        };
        // Serializing plain data with string keys cannot fail.
        let bytes = serde_json::to_vec(&view).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }

    /// Whether stored minutes exist and were generated from the current content.
    #[must_use]
    pub fn minutes_are_current(&self) -> bool {
        self.minutes
            .as_ref()
            .is_some_and(|m| m.source_digest == self.content_digest())
    }
}
