//! A working copy of a meeting list that is edited, then saved wholesale.
//!
//! Agenda and attendee edits follow the same shape: copy the current list,
//! add blank rows, change fields by position, drop rows, then hand the whole
//! list back to the lifecycle controller for replacement. [`EditableList`]
//! implements that once for any [`ListEntry`].

use crate::error::{Error, Result};
use crate::meeting::{new_id, AgendaItem, Attendee, AttendeeStatus};

/// An entity that can be edited in an [`EditableList`].
pub trait ListEntry: Clone {
    /// Identifier prefix for newly added rows.
    const ID_PREFIX: &'static str;

    /// A new, empty row with the given identifier.
    fn blank(id: String) -> Self;

    /// The row's identifier.
    fn id(&self) -> &str;
}

impl ListEntry for AgendaItem {
    const ID_PREFIX: &'static str = "agenda";

    fn blank(id: String) -> Self {
        Self {
            id,
            title: String::new(),
            presenter: String::new(),
            time_allocation: 10,
            notes: String::new(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl ListEntry for Attendee {
    const ID_PREFIX: &'static str = "att";

    fn blank(id: String) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            status: AttendeeStatus::Present,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// An ordered working copy of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableList<T> {
    entries: Vec<T>,
}

impl<T: ListEntry> EditableList<T> {
    /// Start editing a copy of `entries`.
    #[must_use]
    pub fn from_slice(entries: &[T]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Append a blank row with a fresh identifier and return it for editing.
    pub fn add(&mut self) -> &mut T {
        self.entries.push(T::blank(new_id(T::ID_PREFIX)));
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Change the row at `index` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if there is no such row.
    pub fn update<F>(&mut self, index: usize, edit: F) -> Result<&T>
    where
        F: FnOnce(&mut T),
    {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        edit(entry);
        Ok(entry)
    }

    /// Remove and return the row at `index` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if there is no such row.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.entries.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Position of the row with the given identifier.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Current rows.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish editing and return the rows for wholesale replacement.
    #[must_use]
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}
