//! In-memory [`RecordStore`] used by tests and dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::meeting::Meeting;

use super::{decode_collection, RecordStore, DEFAULT_SLOT};

/// Keeps the serialized collection in memory.
///
/// The collection is stored as JSON text, so a round trip through this store
/// exercises the same encoding as the persistent one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The raw serialized collection, if anything was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn raw(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    /// Replace the raw serialized collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn set_raw(&self, raw: impl Into<String>) -> Result<()> {
        *self.lock()? = Some(raw.into());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.blob
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Vec<Meeting>> {
        match self.lock()?.as_deref() {
            Some(raw) => decode_collection(DEFAULT_SLOT, raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, meetings: &[Meeting]) -> Result<()> {
        let raw = serde_json::to_string(meetings)?;
        *self.lock()? = Some(raw);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
