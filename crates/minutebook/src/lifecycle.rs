//! Meeting lifecycle controller.
//!
//! [`MeetingService`] owns every mutation of the meeting collection. Each
//! operation is a synchronous load-modify-save cycle against a
//! [`RecordStore`]; the last write wins. Status only moves forward:
//! `scheduled → inprogress → completed`, and the live-session edits require
//! an in-progress meeting.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::meeting::{
    new_id, ActionItem, AgendaItem, Attendee, Decision, Meeting, MeetingDraft, MeetingStatus,
    MinutesRecord, Outcome,
};
use crate::session::LiveSession;
use crate::storage::RecordStore;
use crate::templates::MeetingTemplate;

/// Source of the current local time.
pub trait Clock {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Fields of an action item supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActionItem {
    /// What needs to be done.
    pub description: String,
    /// Attendee id of the owner.
    pub owner_id: String,
    /// When the task is due.
    pub due_date: Option<NaiveDate>,
}

/// Fields of a decision supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDecision {
    /// Motion text.
    pub motion: String,
    /// Attendee id of the mover.
    pub mover_id: String,
    /// Attendee id of the seconder.
    pub seconder_id: String,
    /// Result of the vote.
    pub outcome: Outcome,
}

/// Parse attendee input: one `Name, Email` pair per line.
///
/// Blank lines are skipped. Fields are split on commas and trimmed; a line
/// without a comma becomes a name with an empty email, and fields past the
/// second are ignored. Malformed lines never fail.
#[must_use]
pub fn parse_attendee_lines(input: &str) -> Vec<Attendee> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let name = fields.next().unwrap_or_default();
            let email = fields.next().unwrap_or_default();
            Attendee::new(name, email)
        })
        .collect()
}

/// Clock time truncated to whole minutes, the resolution shown to users.
fn to_minute(now: NaiveDateTime) -> NaiveTime {
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_else(|| now.time())
}

fn require_session(meeting: &Meeting) -> Result<()> {
    if meeting.status == MeetingStatus::InProgress {
        Ok(())
    } else {
        Err(Error::NotInSession {
            id: meeting.id.clone(),
            status: meeting.status,
        })
    }
}

/// Lifecycle operations over a record store.
#[derive(Debug)]
pub struct MeetingService<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: RecordStore> MeetingService<S, SystemClock> {
    /// Create a service using the system clock.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: RecordStore, C: Clock> MeetingService<S, C> {
    /// Create a service with an explicit clock.
    #[must_use]
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current time according to the service clock.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Schedule a meeting from a template.
    ///
    /// The template's items are copied with fresh identifiers and empty notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store cannot be read or written.
    pub fn create_meeting(
        &self,
        draft: MeetingDraft,
        attendee_lines: &str,
        template: &MeetingTemplate,
    ) -> Result<Meeting> {
        self.create_meeting_with_agenda(
            draft,
            parse_attendee_lines(attendee_lines),
            template.instantiate(),
        )
    }

    /// Schedule a meeting with an explicit attendee list and agenda.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store cannot be read or written.
    pub fn create_meeting_with_agenda(
        &self,
        draft: MeetingDraft,
        attendees: Vec<Attendee>,
        agenda: Vec<AgendaItem>,
    ) -> Result<Meeting> {
        let meeting = Meeting::new(draft, attendees, agenda);
        let mut meetings = self.store.load()?;
        meetings.push(meeting.clone());
        self.store.save(&meetings)?;

        info!(
            "Scheduled meeting {} '{}' with {} attendees and {} agenda items",
            meeting.id,
            meeting.title,
            meeting.attendees.len(),
            meeting.agenda.len()
        );
        Ok(meeting)
    }

    /// Load one meeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn get_meeting(&self, id: &str) -> Result<Meeting> {
        self.store
            .load()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::meeting_not_found(id))
    }

    /// List meetings whose title contains `search` (case-insensitive),
    /// newest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store cannot be read.
    pub fn list_meetings(&self, search: Option<&str>) -> Result<Vec<Meeting>> {
        let needle = search.map(str::to_lowercase).unwrap_or_default();
        let mut meetings: Vec<Meeting> = self
            .store
            .load()?
            .into_iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .collect();
        meetings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(meetings)
    }

    /// Delete a meeting from the record store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn remove_meeting(&self, id: &str) -> Result<Meeting> {
        let mut meetings = self.store.load()?;
        let index = meetings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::meeting_not_found(id))?;
        let removed = meetings.remove(index);
        self.store.save(&meetings)?;

        info!("Removed meeting {} '{}'", removed.id, removed.title);
        Ok(removed)
    }

    /// Open a meeting for its live session.
    ///
    /// A scheduled meeting moves to in-progress; any other status is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn open_for_session(&self, id: &str) -> Result<Meeting> {
        self.update(id, |meeting| {
            if meeting.status == MeetingStatus::Scheduled {
                meeting.status = MeetingStatus::InProgress;
                info!("Meeting {} is now in progress", meeting.id);
            }
            if meeting.status == MeetingStatus::InProgress {
                meeting.active_item = LiveSession::resume(meeting).into_active();
            }
            Ok(meeting.clone())
        })
    }

    /// Make an agenda item the live session's active item.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn select_agenda_item(&self, meeting_id: &str, agenda_item_id: &str) -> Result<Meeting> {
        self.update_live(meeting_id, |meeting| {
            let mut session = LiveSession::resume(meeting);
            if !session.select(meeting, agenda_item_id) {
                return Err(Error::agenda_item_not_found(&meeting.id, agenda_item_id));
            }
            meeting.active_item = session.into_active();
            debug!("Selected agenda item {agenda_item_id} in meeting {}", meeting.id);
            Ok(())
        })
    }

    /// Append text to an agenda item's notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn append_note(&self, meeting_id: &str, agenda_item_id: &str, text: &str) -> Result<Meeting> {
        self.update_live(meeting_id, |meeting| {
            agenda_item_in(meeting, agenda_item_id)?.notes.push_str(text);
            Ok(())
        })
    }

    /// Replace an agenda item's notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn set_notes(&self, meeting_id: &str, agenda_item_id: &str, text: &str) -> Result<Meeting> {
        self.update_live(meeting_id, |meeting| {
            text.clone_into(&mut agenda_item_in(meeting, agenda_item_id)?.notes);
            Ok(())
        })
    }

    /// Append a timestamped speaker marker to an agenda item's notes.
    ///
    /// An attendee that does not resolve leaves the notes untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn record_speaker(
        &self,
        meeting_id: &str,
        agenda_item_id: &str,
        attendee_id: &str,
    ) -> Result<Meeting> {
        let stamp = self.clock.now().format("%H:%M").to_string();
        self.update_live(meeting_id, |meeting| {
            let Some(name) = meeting.attendee(attendee_id).map(|a| a.name.clone()) else {
                debug!("Speaker {attendee_id} not in meeting {}; ignoring", meeting.id);
                return Ok(());
            };
            let item = agenda_item_in(meeting, agenda_item_id)?;
            item.notes.push_str(&format!("\n[{stamp}] {name}: "));
            Ok(())
        })
    }

    /// Log an action item against an agenda item.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn log_action_item(
        &self,
        meeting_id: &str,
        agenda_item_id: &str,
        action: NewActionItem,
    ) -> Result<ActionItem> {
        self.update(meeting_id, |meeting| {
            require_session(meeting)?;
            agenda_item_in(meeting, agenda_item_id)?;
            let item = ActionItem {
                id: new_id("action"),
                description: action.description,
                owner_id: action.owner_id,
                due_date: action.due_date,
                agenda_item_id: agenda_item_id.to_string(),
            };
            meeting.action_items.push(item.clone());
            debug!("Logged action item {} in meeting {}", item.id, meeting.id);
            Ok(item)
        })
    }

    /// Log a decision against an agenda item.
    ///
    /// # Errors
    ///
    /// Returns an error if the meeting or agenda item is missing, or the
    /// meeting is not in progress.
    pub fn log_decision(
        &self,
        meeting_id: &str,
        agenda_item_id: &str,
        decision: NewDecision,
    ) -> Result<Decision> {
        self.update(meeting_id, |meeting| {
            require_session(meeting)?;
            agenda_item_in(meeting, agenda_item_id)?;
            let item = Decision {
                id: new_id("decision"),
                motion: decision.motion,
                mover_id: decision.mover_id,
                seconder_id: decision.seconder_id,
                outcome: decision.outcome,
                agenda_item_id: agenda_item_id.to_string(),
            };
            meeting.decisions.push(item.clone());
            debug!(
                "Logged decision {} ({}) in meeting {}",
                item.id, item.outcome, meeting.id
            );
            Ok(item)
        })
    }

    /// Replace the agenda wholesale.
    ///
    /// Allowed in any status. Action items and decisions that referenced a
    /// dropped item keep their now-dangling reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn replace_agenda(&self, meeting_id: &str, agenda: Vec<AgendaItem>) -> Result<Meeting> {
        self.update(meeting_id, |meeting| {
            debug!(
                "Replacing agenda of meeting {} ({} -> {} items)",
                meeting.id,
                meeting.agenda.len(),
                agenda.len()
            );
            if meeting.status == MeetingStatus::InProgress {
                let mut session = LiveSession::resume(meeting);
                session.agenda_replaced(&agenda);
                meeting.active_item = session.into_active();
            }
            meeting.agenda = agenda;
            Ok(meeting.clone())
        })
    }

    /// Replace the attendee list wholesale.
    ///
    /// Allowed in any status. References to removed attendees resolve to the
    /// "Unknown" display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn replace_attendees(&self, meeting_id: &str, attendees: Vec<Attendee>) -> Result<Meeting> {
        self.update(meeting_id, |meeting| {
            debug!(
                "Replacing attendees of meeting {} ({} -> {})",
                meeting.id,
                meeting.attendees.len(),
                attendees.len()
            );
            meeting.attendees = attendees;
            Ok(meeting.clone())
        })
    }

    /// End the live session: stamp the end time and mark the meeting completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] for a meeting that was never
    /// opened, [`Error::NotInSession`] for one already completed.
    pub fn end_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        let end_time = to_minute(self.clock.now());
        self.update(meeting_id, |meeting| {
            if !meeting.status.can_transition_to(MeetingStatus::Completed) {
                return Err(Error::InvalidTransition {
                    id: meeting.id.clone(),
                    from: meeting.status,
                    to: MeetingStatus::Completed,
                });
            }
            require_session(meeting)?;
            meeting.end_time = Some(end_time);
            meeting.status = MeetingStatus::Completed;
            meeting.active_item = None;
            info!(
                "Meeting {} completed at {}",
                meeting.id,
                end_time.format("%H:%M")
            );
            Ok(meeting.clone())
        })
    }

    /// Store freshly generated minutes, stamped with the current content digest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeetingNotFound`] if no meeting has the given id.
    pub fn store_minutes(&self, meeting_id: &str, text: String) -> Result<Meeting> {
        let generated_at = self.clock.now();
        self.update(meeting_id, |meeting| {
            meeting.minutes = Some(MinutesRecord {
                text,
                generated_at,
                source_digest: meeting.content_digest(),
                edited: false,
            });
            debug!("Stored minutes for meeting {}", meeting.id);
            Ok(meeting.clone())
        })
    }

    /// Replace the stored minutes text with a hand edit.
    ///
    /// The text is not re-validated and the source digest is kept, so an edit
    /// does not by itself make the minutes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MinutesUnavailable`] if nothing was generated yet.
    pub fn edit_minutes(&self, meeting_id: &str, text: String) -> Result<Meeting> {
        self.update(meeting_id, |meeting| {
            let record = meeting.minutes.as_mut().ok_or_else(|| {
                Error::minutes_unavailable(meeting_id, "no minutes have been generated yet")
            })?;
            record.text = text;
            record.edited = true;
            Ok(meeting.clone())
        })
    }

    /// Run `edit` on one meeting and save the collection if it succeeds.
    fn update<T, F>(&self, meeting_id: &str, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Meeting) -> Result<T>,
    {
        let mut meetings = self.store.load()?;
        let meeting = meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| Error::meeting_not_found(meeting_id))?;
        let result = edit(meeting)?;
        self.store.save(&meetings)?;
        Ok(result)
    }

    /// Like [`Self::update`], but only for an in-progress meeting; returns the updated meeting.
    fn update_live<F>(&self, meeting_id: &str, edit: F) -> Result<Meeting>
    where
        F: FnOnce(&mut Meeting) -> Result<()>,
    {
        self.update(meeting_id, |meeting| {
            require_session(meeting)?;
            edit(meeting)?;
            Ok(meeting.clone())
        })
    }
}

fn agenda_item_in<'a>(meeting: &'a mut Meeting, agenda_item_id: &str) -> Result<&'a mut AgendaItem> {
    let meeting_id = meeting.id.clone();
    meeting
        .agenda_item_mut(agenda_item_id)
        .ok_or_else(|| Error::agenda_item_not_found(meeting_id, agenda_item_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::templates::{find_template, BLANK_TEMPLATE};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 42)
            .unwrap()
    }

    fn service() -> MeetingService<MemoryStore, FixedClock> {
        MeetingService::with_clock(MemoryStore::new(), FixedClock(at(14, 5)))
    }

    fn draft(title: &str, date: NaiveDate) -> MeetingDraft {
        MeetingDraft {
            title: title.to_string(),
            date,
            start_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            location: "Hall".to_string(),
        }
    }

    fn board_meeting(svc: &MeetingService<MemoryStore, FixedClock>) -> Meeting {
        let template = find_template("Quarterly Board Meeting").unwrap();
        svc.create_meeting(
            draft("Q2 Board", NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
            "Ann, ann@x.com\nBob, bob@x.com",
            template,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_attendee_lines() {
        let attendees = parse_attendee_lines("Ann, ann@x.com\n\n   \n  Bob  \nCarol,carol@x.com, extra\r\n");
        assert_eq!(attendees.len(), 3);
        assert_eq!(attendees[0].name, "Ann");
        assert_eq!(attendees[0].email, "ann@x.com");
        assert_eq!(attendees[1].name, "Bob");
        assert_eq!(attendees[1].email, "");
        assert_eq!(attendees[2].name, "Carol");
        assert_eq!(attendees[2].email, "carol@x.com");
        assert!(attendees.iter().all(|a| a.id.starts_with("att-")));
    }

    #[test]
    fn test_parse_attendee_lines_tolerates_malformed() {
        let attendees = parse_attendee_lines(",\n, only@x.com");
        assert_eq!(attendees.len(), 2);
        assert_eq!(attendees[0].name, "");
        assert_eq!(attendees[0].email, "");
        assert_eq!(attendees[1].name, "");
        assert_eq!(attendees[1].email, "only@x.com");
    }

    #[test]
    fn test_create_meeting_from_template() {
        let svc = service();
        let meeting = board_meeting(&svc);

        assert_eq!(meeting.status, MeetingStatus::Scheduled);
        assert_eq!(meeting.attendees.len(), 2);
        let titles: Vec<_> = meeting.agenda.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles[0], "Call to Order");
        assert_eq!(titles[6], "Adjournment");
        assert!(meeting.agenda.iter().all(|i| i.notes.is_empty()));
        assert_eq!(svc.store().load().unwrap(), vec![meeting]);
    }

    #[test]
    fn test_create_meeting_from_blank_template() {
        let svc = service();
        let meeting = svc
            .create_meeting(
                draft("Ad hoc", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                "",
                find_template(BLANK_TEMPLATE).unwrap(),
            )
            .unwrap();
        assert!(meeting.agenda.is_empty());
        assert!(meeting.attendees.is_empty());
    }

    #[test]
    fn test_get_meeting_not_found() {
        let svc = service();
        assert!(svc.get_meeting("m-missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_meetings_filters_and_sorts() {
        let svc = service();
        let blank = find_template(BLANK_TEMPLATE).unwrap();
        for (title, month) in [("Board March", 3), ("Staff", 9), ("board june", 6)] {
            svc.create_meeting(
                draft(title, NaiveDate::from_ymd_opt(2025, month, 1).unwrap()),
                "",
                blank,
            )
            .unwrap();
        }

        let all: Vec<_> = svc
            .list_meetings(None)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(all, vec!["Staff", "board june", "Board March"]);

        let boards: Vec<_> = svc
            .list_meetings(Some("BOARD"))
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(boards, vec!["board june", "Board March"]);
    }

    #[test]
    fn test_remove_meeting() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let removed = svc.remove_meeting(&meeting.id).unwrap();
        assert_eq!(removed.id, meeting.id);
        assert!(svc.list_meetings(None).unwrap().is_empty());
        assert!(svc.remove_meeting(&meeting.id).is_err());
    }

    #[test]
    fn test_open_for_session_is_idempotent() {
        let svc = service();
        let meeting = board_meeting(&svc);

        let opened = svc.open_for_session(&meeting.id).unwrap();
        assert_eq!(opened.status, MeetingStatus::InProgress);
        let again = svc.open_for_session(&meeting.id).unwrap();
        assert_eq!(again.status, MeetingStatus::InProgress);

        svc.end_meeting(&meeting.id).unwrap();
        let reopened = svc.open_for_session(&meeting.id).unwrap();
        assert_eq!(reopened.status, MeetingStatus::Completed);
    }

    #[test]
    fn test_append_note_concatenates() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[0].id.clone();
        svc.open_for_session(&meeting.id).unwrap();

        svc.append_note(&meeting.id, &item, "first point. ").unwrap();
        let updated = svc.append_note(&meeting.id, &item, "second point.").unwrap();

        assert!(updated.agenda[0].notes.ends_with("first point. second point."));
    }

    #[test]
    fn test_set_notes_replaces() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[1].id.clone();
        svc.open_for_session(&meeting.id).unwrap();

        svc.append_note(&meeting.id, &item, "draft").unwrap();
        let updated = svc.set_notes(&meeting.id, &item, "final").unwrap();
        assert_eq!(updated.agenda[1].notes, "final");
    }

    #[test]
    fn test_live_edits_require_session() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[0].id.clone();

        let err = svc.append_note(&meeting.id, &item, "x").unwrap_err();
        assert!(matches!(err, Error::NotInSession { .. }));

        svc.open_for_session(&meeting.id).unwrap();
        svc.end_meeting(&meeting.id).unwrap();

        let err = svc.append_note(&meeting.id, &item, "x").unwrap_err();
        assert!(err.is_lifecycle_error());
        let err = svc
            .log_decision(
                &meeting.id,
                &item,
                NewDecision {
                    motion: "late".to_string(),
                    mover_id: String::new(),
                    seconder_id: String::new(),
                    outcome: Outcome::Tabled,
                },
            )
            .unwrap_err();
        assert!(err.is_lifecycle_error());
    }

    #[test]
    fn test_append_note_unknown_agenda_item() {
        let svc = service();
        let meeting = board_meeting(&svc);
        svc.open_for_session(&meeting.id).unwrap();

        let err = svc
            .append_note(&meeting.id, "agenda-missing", "x")
            .unwrap_err();
        assert!(matches!(err, Error::AgendaItemNotFound { .. }));
    }

    #[test]
    fn test_record_speaker_appends_marker() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[2].id.clone();
        let bob = meeting.attendees[1].id.clone();
        svc.open_for_session(&meeting.id).unwrap();

        svc.append_note(&meeting.id, &item, "Revenue is up.").unwrap();
        let updated = svc.record_speaker(&meeting.id, &item, &bob).unwrap();
        assert_eq!(updated.agenda[2].notes, "Revenue is up.\n[14:05] Bob: ");
    }

    #[test]
    fn test_record_speaker_unknown_attendee_is_noop() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[0].id.clone();
        svc.open_for_session(&meeting.id).unwrap();

        let updated = svc.record_speaker(&meeting.id, &item, "att-gone").unwrap();
        assert!(updated.agenda[0].notes.is_empty());
    }

    #[test]
    fn test_log_action_item_requires_known_agenda_item() {
        let svc = service();
        let meeting = board_meeting(&svc);
        svc.open_for_session(&meeting.id).unwrap();

        let err = svc
            .log_action_item(
                &meeting.id,
                "agenda-missing",
                NewActionItem {
                    description: "Send report".to_string(),
                    owner_id: meeting.attendees[0].id.clone(),
                    due_date: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::AgendaItemNotFound { .. }));
        assert!(svc.get_meeting(&meeting.id).unwrap().action_items.is_empty());
    }

    #[test]
    fn test_log_action_item_is_stamped() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[3].id.clone();
        svc.open_for_session(&meeting.id).unwrap();

        let action = svc
            .log_action_item(
                &meeting.id,
                &item,
                NewActionItem {
                    description: "Circulate accounts".to_string(),
                    owner_id: meeting.attendees[1].id.clone(),
                    due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
                },
            )
            .unwrap();

        assert!(action.id.starts_with("action-"));
        assert_eq!(action.agenda_item_id, item);
        let stored = svc.get_meeting(&meeting.id).unwrap();
        assert_eq!(stored.action_items, vec![action]);
    }

    #[test]
    fn test_end_meeting_from_scheduled_is_rejected() {
        let svc = service();
        let meeting = board_meeting(&svc);

        let err = svc.end_meeting(&meeting.id).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: MeetingStatus::Scheduled,
                to: MeetingStatus::Completed,
                ..
            }
        ));
        assert_eq!(
            svc.get_meeting(&meeting.id).unwrap().status,
            MeetingStatus::Scheduled
        );
    }

    #[test]
    fn test_end_meeting_twice_is_rejected() {
        let svc = service();
        let meeting = board_meeting(&svc);
        svc.open_for_session(&meeting.id).unwrap();
        svc.end_meeting(&meeting.id).unwrap();

        assert!(svc.end_meeting(&meeting.id).unwrap_err().is_lifecycle_error());
    }

    #[test]
    fn test_replace_agenda_after_completion_makes_minutes_stale() {
        let svc = service();
        let meeting = board_meeting(&svc);
        svc.open_for_session(&meeting.id).unwrap();
        svc.end_meeting(&meeting.id).unwrap();

        let stored = svc.store_minutes(&meeting.id, "# Q2 Board".to_string()).unwrap();
        assert!(stored.minutes_are_current());

        let mut agenda = stored.agenda.clone();
        agenda.truncate(2);
        let updated = svc.replace_agenda(&meeting.id, agenda).unwrap();
        assert_eq!(updated.agenda.len(), 2);
        assert_eq!(updated.status, MeetingStatus::Completed);
        assert!(!updated.minutes_are_current());
    }

    #[test]
    fn test_replace_attendees_leaves_dangling_references() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let item = meeting.agenda[0].id.clone();
        let ann = meeting.attendees[0].id.clone();
        svc.open_for_session(&meeting.id).unwrap();
        svc.log_action_item(
            &meeting.id,
            &item,
            NewActionItem {
                description: "Book venue".to_string(),
                owner_id: ann,
                due_date: None,
            },
        )
        .unwrap();

        let updated = svc
            .replace_attendees(&meeting.id, vec![Attendee::new("Zed", "")])
            .unwrap();
        assert_eq!(updated.attendee_name(&updated.action_items[0].owner_id), "Unknown");
    }

    #[test]
    fn test_store_and_edit_minutes() {
        let svc = service();
        let meeting = board_meeting(&svc);

        let err = svc.edit_minutes(&meeting.id, "x".to_string()).unwrap_err();
        assert!(matches!(err, Error::MinutesUnavailable { .. }));

        let stored = svc.store_minutes(&meeting.id, "draft".to_string()).unwrap();
        let record = stored.minutes.unwrap();
        assert_eq!(record.generated_at, at(14, 5));
        assert!(!record.edited);

        let edited = svc.edit_minutes(&meeting.id, "final".to_string()).unwrap();
        let record = edited.minutes.as_ref().unwrap();
        assert_eq!(record.text, "final");
        assert!(record.edited);
        assert!(edited.minutes_are_current());
    }

    #[test]
    fn test_end_to_end_session() {
        let svc = service();
        let meeting = svc
            .create_meeting(
                draft("Committee", NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
                "Ann, ann@x.com\n",
                find_template("Quarterly Board Meeting").unwrap(),
            )
            .unwrap();
        assert_eq!(meeting.attendees.len(), 1);

        let ann = meeting.attendees[0].id.clone();
        let first = meeting.agenda[0].id.clone();
        svc.open_for_session(&meeting.id).unwrap();
        svc.log_decision(
            &meeting.id,
            &first,
            NewDecision {
                motion: "Adopt the agenda".to_string(),
                mover_id: ann.clone(),
                seconder_id: "att-nobody".to_string(),
                outcome: Outcome::Carried,
            },
        )
        .unwrap();
        let ended = svc.end_meeting(&meeting.id).unwrap();

        assert_eq!(ended.status, MeetingStatus::Completed);
        assert_eq!(ended.end_time, NaiveTime::from_hms_opt(14, 5, 0));
        let decision = &ended.decisions[0];
        assert_eq!(decision.agenda_item_id, first);
        assert_eq!(decision.outcome, Outcome::Carried);
        assert_eq!(ended.attendee_name(&decision.mover_id), "Ann");
        assert_eq!(ended.attendee_name(&decision.seconder_id), "Unknown");
    }

    #[test]
    fn test_one_save_per_mutation() {
        let svc = service();
        let meeting = board_meeting(&svc);
        assert_eq!(svc.store().save_count(), 1);

        svc.open_for_session(&meeting.id).unwrap();
        svc.append_note(&meeting.id, &meeting.agenda[0].id, "Quorum.")
            .unwrap();
        assert_eq!(svc.store().save_count(), 3);

        // Rejected edits leave the store untouched
        assert!(svc.append_note(&meeting.id, "agenda-missing", "x").is_err());
        assert!(svc.get_meeting(&meeting.id).is_ok());
        assert_eq!(svc.store().save_count(), 3);
    }

    #[test]
    fn test_corrupt_collection_is_reported() {
        let svc = service();
        svc.store().set_raw("[{\"id\": 7}]").unwrap();

        let err = svc.list_meetings(None).unwrap_err();
        assert!(matches!(err, Error::CorruptSlot { .. }));
    }

    #[test]
    fn test_open_for_session_stores_first_item() {
        let svc = service();
        let meeting = board_meeting(&svc);
        assert!(meeting.active_item.is_none());

        let opened = svc.open_for_session(&meeting.id).unwrap();
        assert_eq!(opened.active_item.as_deref(), Some(meeting.agenda[0].id.as_str()));

        let raw = svc.store().raw().unwrap().unwrap();
        assert!(raw.contains("\"activeItem\""));
    }

    #[test]
    fn test_select_agenda_item_persists() {
        let svc = service();
        let meeting = board_meeting(&svc);
        let third = meeting.agenda[2].id.clone();

        assert!(matches!(
            svc.select_agenda_item(&meeting.id, &third),
            Err(Error::NotInSession { .. })
        ));

        svc.open_for_session(&meeting.id).unwrap();
        svc.select_agenda_item(&meeting.id, &third).unwrap();
        assert!(svc
            .select_agenda_item(&meeting.id, "agenda-missing")
            .unwrap_err()
            .is_not_found());

        // Reopening resumes where the session left off
        let reopened = svc.open_for_session(&meeting.id).unwrap();
        assert_eq!(reopened.active_item.as_deref(), Some(third.as_str()));
    }

    #[test]
    fn test_replace_agenda_reanchors_active_item() {
        let svc = service();
        let meeting = board_meeting(&svc);
        svc.open_for_session(&meeting.id).unwrap();
        svc.select_agenda_item(&meeting.id, &meeting.agenda[2].id)
            .unwrap();

        let kept = svc
            .replace_agenda(&meeting.id, meeting.agenda[1..].to_vec())
            .unwrap();
        assert_eq!(kept.active_item.as_deref(), Some(meeting.agenda[2].id.as_str()));

        let dropped = svc
            .replace_agenda(&meeting.id, meeting.agenda[3..].to_vec())
            .unwrap();
        assert_eq!(dropped.active_item.as_deref(), Some(meeting.agenda[3].id.as_str()));

        let cleared = svc.replace_agenda(&meeting.id, Vec::new()).unwrap();
        assert!(cleared.active_item.is_none());

        let ended = svc.end_meeting(&meeting.id).unwrap();
        assert!(ended.active_item.is_none());
    }
}
