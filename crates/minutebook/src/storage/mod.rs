//! Record store for minutebook.
//!
//! All meetings are persisted as one serialized collection under a single
//! named slot of a key-value store: the whole collection is read on load and
//! written back on every mutation. [`RecordStore`] is the port the lifecycle
//! controller depends on; [`SqliteStore`] backs it with a `SQLite` slot table
//! and [`MemoryStore`] keeps it in memory for tests.

mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::meeting::Meeting;

pub use memory::MemoryStore;

/// Default slot holding the meeting collection.
pub const DEFAULT_SLOT: &str = "meetings";

/// Storage port for the meeting collection.
pub trait RecordStore {
    /// Read the whole collection. A missing slot yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or decoded.
    fn load(&self) -> Result<Vec<Meeting>>;

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be encoded or written.
    fn save(&self, meetings: &[Meeting]) -> Result<()>;
}

/// Decode a stored collection, attributing failures to the slot.
pub(crate) fn decode_collection(slot: &str, raw: &str) -> Result<Vec<Meeting>> {
    serde_json::from_str(raw).map_err(|source| Error::CorruptSlot {
        slot: slot.to_string(),
        source,
    })
}

/// `SQLite`-backed key-value store.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Slot holding the meeting collection.
    slot: String,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, slot: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path,
            slot: slot.into(),
            conn,
        })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(slot: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            slot: slot.into(),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the slot name holding the meeting collection.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(schema::UPSERT_SLOT, params![key, value, now])?;
        Ok(())
    }

    /// Get statistics about the meeting slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT LENGTH(value), updated_at FROM slots WHERE key = ?1",
                [&self.slot],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (slot_bytes, last_write) = match row {
            Some((len, updated_at)) => (
                u64::try_from(len).unwrap_or(0),
                DateTime::parse_from_rfc3339(&updated_at)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            ),
            None => (0, None),
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            slot_bytes,
            last_write,
            db_size_bytes,
        })
    }
}

impl RecordStore for SqliteStore {
    fn load(&self) -> Result<Vec<Meeting>> {
        match self.read_slot(&self.slot)? {
            Some(raw) => decode_collection(&self.slot, &raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, meetings: &[Meeting]) -> Result<()> {
        let raw = serde_json::to_string(meetings)?;
        self.write_slot(&self.slot, &raw)?;
        debug!(
            "Saved {} meetings ({} bytes) to slot '{}'",
            meetings.len(),
            raw.len(),
            self.slot
        );
        Ok(())
    }
}

/// Statistics about the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Size of the serialized meeting collection.
    pub slot_bytes: u64,
    /// When the collection was last written.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
