//! Persisted record shapes exchanged between the store and the file codec.

use serde::{Deserialize, Serialize};

use crate::{GuildId, MessageId, RoleId};

/// One guild's mappings, as written to the mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRecord {
    pub guild: GuildId,
    pub entries: Vec<MappingEntry>,
}

impl GuildRecord {
    /// Create an empty record for a guild.
    pub fn new(guild: GuildId) -> Self {
        Self {
            guild,
            entries: Vec::new(),
        }
    }

    /// Builder method to append a message -> role entry.
    pub fn with_entry(mut self, message: MessageId, role: RoleId) -> Self {
        self.entries.push(MappingEntry { message, role });
        self
    }
}

/// A single message -> role entry inside a [`GuildRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub message: MessageId,
    pub role: RoleId,
}

/// Summary of a bulk load into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Guild records that contributed at least one mapping.
    pub guilds: usize,
    /// Mapping entries applied.
    pub mappings: usize,
    /// Guild records skipped because they carried no entries.
    pub skipped_records: usize,
}
