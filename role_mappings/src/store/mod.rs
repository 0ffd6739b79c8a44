//! Mapping store - the process-wide guild -> message -> role table.
//!
//! Every operation takes one store-wide lock for its full duration, so all
//! operations are linearizable with respect to each other. Lookups never
//! create entries.

mod record;

pub use record::*;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::{GuildId, Mapping, MappingError, MessageId, RoleId};

type GuildTable = HashMap<GuildId, HashMap<MessageId, RoleId>>;

/// The reaction-for-role mapping table.
///
/// Share it as `Arc<MappingStore>`; callers never get a reference into the
/// inner maps.
#[derive(Debug, Default)]
pub struct MappingStore {
    guilds: Mutex<GuildTable>,
}

impl MappingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the table half-updated:
    // every mutation is a single map insert or remove.
    fn table(&self) -> MutexGuard<'_, GuildTable> {
        self.guilds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register or overwrite the role granted by reacting to `message`.
    ///
    /// Returns the role that was replaced, if any. Does not persist.
    pub fn add_mapping(&self, guild: GuildId, message: MessageId, role: RoleId) -> Option<RoleId> {
        self.table().entry(guild).or_default().insert(message, role)
    }

    /// [`add_mapping`](Self::add_mapping) for callers holding optional identifiers.
    pub fn try_add_mapping(
        &self,
        guild: Option<GuildId>,
        message: Option<MessageId>,
        role: Option<RoleId>,
    ) -> Result<Option<RoleId>, MappingError> {
        let mapping = Mapping::from_parts(guild, message, role)?;
        Ok(self.add_mapping(mapping.guild, mapping.message, mapping.role))
    }

    /// Remove the mapping for `message` only if it currently grants `role`.
    ///
    /// Returns whether a mapping was removed. A mismatched role is a no-op, so
    /// an admin removing a stale mapping cannot clobber a newer one.
    pub fn remove_mapping(&self, guild: GuildId, message: MessageId, role: RoleId) -> bool {
        let mut table = self.table();
        let Some(messages) = table.get_mut(&guild) else {
            return false;
        };
        if messages.get(&message) == Some(&role) {
            messages.remove(&message);
            true
        } else {
            false
        }
    }

    /// [`remove_mapping`](Self::remove_mapping) for callers holding optional identifiers.
    pub fn try_remove_mapping(
        &self,
        guild: Option<GuildId>,
        message: Option<MessageId>,
        role: Option<RoleId>,
    ) -> Result<bool, MappingError> {
        let mapping = Mapping::from_parts(guild, message, role)?;
        Ok(self.remove_mapping(mapping.guild, mapping.message, mapping.role))
    }

    /// Get the role granted by reacting to `message` in `guild`.
    pub fn get_mapping(&self, guild: GuildId, message: MessageId) -> Option<RoleId> {
        self.table()
            .get(&guild)
            .and_then(|messages| messages.get(&message))
            .copied()
    }

    /// Merge records into the store.
    ///
    /// Each record is handled on its own: a record without entries is skipped
    /// with a warning and the rest still load. Entries are applied one
    /// [`add_mapping`](Self::add_mapping) at a time, so concurrent readers see
    /// either the old or the new value for any message.
    pub fn load<I>(&self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = GuildRecord>,
    {
        let mut report = LoadReport::default();

        for record in records {
            if record.entries.is_empty() {
                warn!(
                    guild = %record.guild,
                    "No mappings were provided for guild, skipping record"
                );
                report.skipped_records += 1;
                continue;
            }

            for entry in &record.entries {
                self.add_mapping(record.guild, entry.message, entry.role);
            }
            report.guilds += 1;
            report.mappings += record.entries.len();
        }

        report
    }

    /// Copy the table out in ascending guild, then message, order.
    ///
    /// Guilds whose mappings have all been removed are omitted.
    pub fn snapshot(&self) -> Vec<GuildRecord> {
        let table = self.table();

        let mut records: Vec<GuildRecord> = table
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(guild, messages)| {
                let mut entries: Vec<MappingEntry> = messages
                    .iter()
                    .map(|(message, role)| MappingEntry {
                        message: *message,
                        role: *role,
                    })
                    .collect();
                entries.sort_by_key(|entry| entry.message);
                GuildRecord {
                    guild: *guild,
                    entries,
                }
            })
            .collect();
        records.sort_by_key(|record| record.guild);

        records
    }

    /// Get a guild's mappings, ordered by message.
    pub fn guild_mappings(&self, guild: GuildId) -> Vec<(MessageId, RoleId)> {
        let mut mappings: Vec<_> = self
            .table()
            .get(&guild)
            .map(|messages| messages.iter().map(|(m, r)| (*m, *r)).collect())
            .unwrap_or_default();
        mappings.sort();
        mappings
    }

    /// Get the total number of mappings across all guilds.
    pub fn len(&self) -> usize {
        self.table().values().map(HashMap::len).sum()
    }

    /// Check if the store holds no mappings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
