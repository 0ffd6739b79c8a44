//! Mapping file codec - loads and saves the store as a JSON array.
//!
//! File format:
//!
//! ```json
//! [ { "guild": 1, "entries": [ { "message": 2, "role": 3 } ] } ]
//! ```
//!
//! Persistence favors availability: a corrupt file is reset on load and
//! overwritten on save rather than blocking either.

mod document;

pub use document::*;

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{GuildRecord, MappingError};

/// Result of a [`MappingFile::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// New content was written to disk.
    Written,
    /// The file already held identical mappings; nothing was written.
    Unchanged,
}

/// The on-disk mapping file.
#[derive(Debug, Clone)]
pub struct MappingFile {
    path: PathBuf,
}

impl MappingFile {
    /// Create a codec for the file at `path`. Nothing is touched until load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all well-formed guild records from the file.
    ///
    /// Creates the file and its directory when missing. Content that is not
    /// a JSON array is replaced with `[]`. Only I/O failures are returned.
    pub fn load(&self) -> Result<Vec<GuildRecord>, MappingError> {
        info!(path = %self.path.display(), "Loading reaction-role mappings from file");
        if self.ensure_exists()? {
            debug!(path = %self.path.display(), "Created new mapping file");
            self.reset()?;
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| MappingError::io(&self.path, e))?;
        if content.trim().is_empty() {
            warn!(path = %self.path.display(), "Mapping file is empty, initializing it");
            self.reset()?;
            return Ok(Vec::new());
        }

        let items = match serde_json::from_str::<Value>(&content).map_err(MappingError::Parse) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!(
                    path = %self.path.display(),
                    "Mapping file is not a JSON array, resetting it"
                );
                self.reset()?;
                Vec::new()
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Mapping file is unreadable, resetting it"
                );
                self.reset()?;
                Vec::new()
            }
        };

        let records = parse_records(&items);
        info!(
            path = %self.path.display(),
            guilds = records.len(),
            skipped = items.len() - records.len(),
            "Reaction-role mappings loaded from file"
        );
        Ok(records)
    }

    /// Write `records` to the file in ascending guild and message order.
    ///
    /// If the file already parses to the same document, nothing is written. A
    /// missing or malformed file is overwritten unconditionally.
    pub fn save(&self, records: &[GuildRecord]) -> Result<SaveOutcome, MappingError> {
        let records = canonical(records);
        let document = serde_json::to_value(&records).map_err(MappingError::Encode)?;

        match self.read_existing() {
            Ok(existing) if existing == document => {
                debug!(path = %self.path.display(), "Mappings unchanged, skipping write");
                return Ok(SaveOutcome::Unchanged);
            }
            Ok(_) => {}
            Err(err) => {
                debug!(
                    path = %self.path.display(),
                    error = %err,
                    "Existing mapping file unusable, overwriting"
                );
            }
        }

        self.ensure_parent()?;
        // Written from the typed records to keep field order stable.
        let content = serde_json::to_string(&records).map_err(MappingError::Encode)?;
        fs::write(&self.path, content).map_err(|e| MappingError::io(&self.path, e))?;

        info!(path = %self.path.display(), guilds = records.len(), "Mappings saved to file");
        Ok(SaveOutcome::Written)
    }

    fn read_existing(&self) -> Result<Value, MappingError> {
        let content = fs::read_to_string(&self.path).map_err(|e| MappingError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(MappingError::Parse)
    }

    fn ensure_parent(&self) -> Result<(), MappingError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| MappingError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    // An existing file is only ever read here, so read-only mounts still load.
    // Returns whether the file was created by this call.
    fn ensure_exists(&self) -> Result<bool, MappingError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.ensure_parent()?;
        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(MappingError::io(&self.path, e)),
        }
    }

    fn reset(&self) -> Result<(), MappingError> {
        fs::write(&self.path, "[]").map_err(|e| MappingError::io(&self.path, e))
    }
}

/// Sort records at both levels and drop guilds without entries.
fn canonical(records: &[GuildRecord]) -> Vec<GuildRecord> {
    let mut records: Vec<GuildRecord> = records
        .iter()
        .filter(|record| !record.entries.is_empty())
        .cloned()
        .collect();
    for record in &mut records {
        record.entries.sort_by_key(|entry| entry.message);
    }
    records.sort_by_key(|record| record.guild);
    records
}
