//! Storage slot backends.
//!
//! A slot is a single named location holding one serialized snapshot. Writes
//! replace the whole slot.

use crate::StoreError;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Durable key-value storage addressed by slot name.
pub trait SlotBackend {
    /// Contents of `slot`, or `None` if it was never written.
    fn read_slot(&self, slot: &str) -> Result<Option<String>, StoreError>;

    /// Replace the contents of `slot`.
    fn write_slot(&mut self, slot: &str, contents: &str) -> Result<(), StoreError>;
}

/// One JSON file per slot inside a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the slot file, so readers never observe a partial snapshot.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl SlotBackend for FileBackend {
    fn read_slot(&self, slot: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn write_slot(&mut self, slot: &str, contents: &str) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            slot: slot.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(self.slot_path(slot))
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// In-process slots, for tests and embedding without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with raw slot contents.
    pub fn with_slot(slot: &str, contents: &str) -> Self {
        let mut b = Self::default();
        b.slots.insert(slot.to_string(), contents.to_string());
        b
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn contents(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

impl SlotBackend for MemoryBackend {
    fn read_slot(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write_slot(&mut self, slot: &str, contents: &str) -> Result<(), StoreError> {
        self.slots.insert(slot.to_string(), contents.to_string());
        self.writes += 1;
        Ok(())
    }
}
