//! Active agenda item cursor for a live session.
//!
//! The cursor is stored on the meeting record as [`Meeting::active_item`] so
//! it survives between commands.

use crate::meeting::{AgendaItem, Meeting};

/// Tracks which agenda item a live session is working on.
///
/// Notes, speakers, action items and decisions are all recorded against the
/// active item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSession {
    active: Option<String>,
}

impl LiveSession {
    /// Start a session on the meeting's first agenda item, if any.
    #[must_use]
    pub fn start(meeting: &Meeting) -> Self {
        Self {
            active: meeting.agenda.first().map(|item| item.id.clone()),
        }
    }

    /// Resume the session stored on the meeting.
    ///
    /// Falls back to [`Self::start`] when nothing is stored or the stored item
    /// is no longer on the agenda.
    #[must_use]
    pub fn resume(meeting: &Meeting) -> Self {
        match meeting.active_item.as_deref() {
            Some(id) if meeting.agenda_item(id).is_some() => Self {
                active: Some(id.to_string()),
            },
            _ => Self::start(meeting),
        }
    }

    /// Identifier of the active agenda item.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active agenda item, resolved against `meeting`.
    #[must_use]
    pub fn active_item<'a>(&self, meeting: &'a Meeting) -> Option<&'a AgendaItem> {
        self.active.as_deref().and_then(|id| meeting.agenda_item(id))
    }

    /// Make the item with the given id active.
    ///
    /// Returns `false` and leaves the cursor unchanged if the meeting has no
    /// such item.
    pub fn select(&mut self, meeting: &Meeting, agenda_item_id: &str) -> bool {
        if meeting.agenda_item(agenda_item_id).is_some() {
            self.active = Some(agenda_item_id.to_string());
            true
        } else {
            false
        }
    }

    /// Finish with the cursor, e.g. to store it on the meeting.
    #[must_use]
    pub fn into_active(self) -> Option<String> {
        self.active
    }

    /// Re-anchor the cursor after the agenda was replaced.
    ///
    /// Keeps the active item if it survived, falls back to the first item
    /// otherwise, and clears when the agenda is empty.
    pub fn agenda_replaced(&mut self, agenda: &[AgendaItem]) {
        let survived = self
            .active
            .as_deref()
            .is_some_and(|id| agenda.iter().any(|item| item.id == id));
        if !survived {
            self.active = agenda.first().map(|item| item.id.clone());
        }
    }
}
