//! Error types for minutebook.
//!
//! This module defines the error type shared by the record store, the meeting
//! lifecycle and the document pipeline, with enough context to render a
//! user-facing message from the CLI.

use std::path::PathBuf;
use thiserror::Error;

use crate::meeting::MeetingStatus;

/// The main error type for minutebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The stored meeting collection could not be decoded.
    #[error("stored meetings in slot '{slot}' are unreadable: {source}")]
    CorruptSlot {
        /// Name of the key-value slot.
        slot: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Meeting Errors ===
    /// No meeting with the given identifier exists.
    #[error("meeting not found: {id}")]
    MeetingNotFound {
        /// The requested meeting identifier.
        id: String,
    },

    /// The agenda item reference does not name an item of the meeting.
    #[error("agenda item '{item}' not found in meeting {meeting_id}")]
    AgendaItemNotFound {
        /// The meeting that was searched.
        meeting_id: String,
        /// The agenda item id or position that failed to resolve.
        item: String,
    },

    /// The attendee reference does not name an attendee of the meeting.
    #[error("attendee '{attendee}' not found in meeting {meeting_id}")]
    AttendeeNotFound {
        /// The meeting that was searched.
        meeting_id: String,
        /// The attendee id or position that failed to resolve.
        attendee: String,
    },

    /// A status change would move a meeting backwards or skip the session.
    #[error("meeting {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The meeting identifier.
        id: String,
        /// Current status.
        from: MeetingStatus,
        /// Requested status.
        to: MeetingStatus,
    },

    /// A live-session edit was attempted outside of the session.
    #[error("meeting {id} is {status}; live edits require an in-progress meeting")]
    NotInSession {
        /// The meeting identifier.
        id: String,
        /// Current status.
        status: MeetingStatus,
    },

    /// The requested meeting template does not exist.
    #[error("unknown meeting template '{name}'")]
    UnknownTemplate {
        /// Name that was requested.
        name: String,
    },

    /// Export or email was requested without a successfully generated draft.
    #[error("minutes for meeting {id} are not available: {reason}")]
    MinutesUnavailable {
        /// The meeting identifier.
        id: String,
        /// Why the minutes cannot be used.
        reason: String,
    },

    /// An editable list index was out of range.
    #[error("no entry at position {index} (list has {len})")]
    IndexOutOfRange {
        /// Requested position (zero-based).
        index: usize,
        /// Number of entries in the list.
        len: usize,
    },

    /// User supplied input that could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for minutebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a meeting-not-found error.
    #[must_use]
    pub fn meeting_not_found(id: impl Into<String>) -> Self {
        Self::MeetingNotFound { id: id.into() }
    }

    /// Create an agenda-item-not-found error.
    #[must_use]
    pub fn agenda_item_not_found(meeting_id: impl Into<String>, item: impl Into<String>) -> Self {
        Self::AgendaItemNotFound {
            meeting_id: meeting_id.into(),
            item: item.into(),
        }
    }

    /// Create an attendee-not-found error.
    #[must_use]
    pub fn attendee_not_found(meeting_id: impl Into<String>, attendee: impl Into<String>) -> Self {
        Self::AttendeeNotFound {
            meeting_id: meeting_id.into(),
            attendee: attendee.into(),
        }
    }

    /// Create a minutes-unavailable error.
    #[must_use]
    pub fn minutes_unavailable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MinutesUnavailable {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MeetingNotFound { .. }
                | Self::AgendaItemNotFound { .. }
                | Self::AttendeeNotFound { .. }
        )
    }

    /// Check if this error was caused by the meeting's lifecycle state.
    #[must_use]
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::NotInSession { .. }
        )
    }
}
