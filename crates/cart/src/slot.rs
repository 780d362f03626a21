//! Persistent snapshot slot implementations.
//!
//! A slot is one string-valued storage cell (see
//! [`CartSlot`](crate::ports::CartSlot)). [`FileSlot`] keeps the cell in a
//! JSON file on disk; [`MemorySlot`] keeps it in process memory for tests
//! and embedders that opt out of persistence.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::ports::{CartSlot, SlotError};

/// File-backed slot: one JSON document at a fixed path.
///
/// A missing file reads as an empty cell; writes overwrite the whole file.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Create a slot bound to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this slot reads and writes.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotError::Read(e.to_string())),
        }
    }

    fn store(&self, snapshot: &str) -> Result<(), SlotError> {
        std::fs::write(&self.path, snapshot).map_err(|e| SlotError::Write(e.to_string()))
    }
}

/// In-memory slot backed by a mutex-guarded cell.
#[derive(Debug, Default)]
pub struct MemorySlot {
    cell: Mutex<Option<String>>,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-seeded with a snapshot.
    #[must_use]
    pub fn with_value(snapshot: impl Into<String>) -> Self {
        Self {
            cell: Mutex::new(Some(snapshot.into())),
        }
    }

    /// The current cell contents.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.cell.lock().map_or(None, |cell| cell.clone())
    }
}

impl CartSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        self.cell
            .lock()
            .map(|cell| cell.clone())
            .map_err(|e| SlotError::Read(e.to_string()))
    }

    fn store(&self, snapshot: &str) -> Result<(), SlotError> {
        let mut cell = self
            .cell
            .lock()
            .map_err(|e| SlotError::Write(e.to_string()))?;
        *cell = Some(snapshot.to_string());
        Ok(())
    }
}
