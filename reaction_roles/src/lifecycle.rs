//! Process lifecycle: one store per process, loaded at start and saved at shutdown.

use std::sync::Arc;

use role_mappings::{MappingError, MappingFile, MappingStore, SaveOutcome};
use tracing::{error, info};

use crate::config::Config;
use crate::gateway::GuildGateway;
use crate::handler::ReactionHandler;

/// The process-scoped mapping store and the file backing it.
pub struct ReactionRoles {
    store: Arc<MappingStore>,
    file: MappingFile,
}

impl ReactionRoles {
    /// Load the configured mapping file into a fresh store.
    pub fn start(config: &Config) -> Self {
        Self::open(MappingFile::new(&config.storage.path))
    }

    /// Load `file` into a fresh store.
    ///
    /// A load failure is logged and the store starts empty.
    pub fn open(file: MappingFile) -> Self {
        let store = Arc::new(MappingStore::new());

        match file.load() {
            Ok(records) => {
                let report = store.load(records);
                info!(
                    guilds = report.guilds,
                    mappings = report.mappings,
                    skipped = report.skipped_records,
                    "Reaction-role store ready"
                );
            }
            Err(err) => {
                error!(
                    path = %file.path().display(),
                    error = %err,
                    "Failed to load the reaction-role mapping file, starting with an empty store"
                );
            }
        }

        Self { store, file }
    }

    /// Get a shared handle to the store.
    pub fn store(&self) -> Arc<MappingStore> {
        Arc::clone(&self.store)
    }

    /// Create a reaction handler over this store.
    pub fn handler<G: GuildGateway + 'static>(&self, gateway: Arc<G>) -> ReactionHandler<G> {
        ReactionHandler::new(self.store(), gateway)
    }

    /// Persist the current mappings. Skips the write when nothing changed.
    pub fn save(&self) -> Result<SaveOutcome, MappingError> {
        self.file.save(&self.store.snapshot()).inspect_err(|err| {
            error!(
                path = %self.file.path().display(),
                error = %err,
                "Failed to save reaction-role mappings"
            );
        })
    }

    /// Final save. Errors are logged, not returned.
    pub fn shutdown(self) {
        if self.save().is_ok() {
            info!("Reaction-role store shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use role_mappings::{GuildId, MessageId, RoleId};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_start_with_fresh_directory() {
        let dir = TempDir::new().unwrap();
        let roles = ReactionRoles::open(MappingFile::new(dir.path().join("assets/rfr.json")));

        assert!(roles.store().is_empty());
        assert!(dir.path().join("assets/rfr.json").exists());
    }

    #[test]
    fn test_load_failure_starts_empty() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let roles = ReactionRoles::open(MappingFile::new(blocker.join("rfr.json")));

        assert!(roles.store().is_empty());
        roles.store().add_mapping(GuildId(1), MessageId(2), RoleId(3));
        assert!(roles.save().is_err());
        assert_eq!(roles.store().get_mapping(GuildId(1), MessageId(2)), Some(RoleId(3)));
    }

    #[test]
    fn test_mappings_survive_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rfr.json");

        let roles = ReactionRoles::open(MappingFile::new(&path));
        roles.store().add_mapping(GuildId(1), MessageId(2), RoleId(3));
        roles.shutdown();

        let roles = ReactionRoles::open(MappingFile::new(&path));
        assert_eq!(roles.store().get_mapping(GuildId(1), MessageId(2)), Some(RoleId(3)));
        assert_eq!(roles.save().unwrap(), SaveOutcome::Unchanged);
    }
}
