use crate::config::Config;
use crate::directory::{Directory, DuplicatePolicy};
use crate::error::Result;
use crate::record::{DirectoryRecord, UnitKey};
use crate::sheet::{backend_from_config, SheetBackend};
use std::path::Path;

// ---------------------------------------------------------------------------
// DirectoryStore
// ---------------------------------------------------------------------------

/// Repository over the tenant directory.
///
/// Owns the sheet backend handle plus a cached copy of the table. Callers
/// hold the store and trigger `refresh()` explicitly; nothing reloads behind
/// their back. Mutations follow the sheet's whole-table protocol: re-read,
/// modify in memory, write everything back.
pub struct DirectoryStore {
    backend: Box<dyn SheetBackend>,
    policy: DuplicatePolicy,
    directory: Directory,
}

impl DirectoryStore {
    /// Open the store for a workspace: build the configured backend and do
    /// the initial read, substituting an empty table if the sheet is
    /// unreachable.
    pub fn open(root: &Path, config: &Config) -> Result<Self> {
        let backend = backend_from_config(root, config)?;
        let mut store = Self {
            backend,
            policy: config.lookup.duplicate_policy,
            directory: Directory::default(),
        };
        store.refresh_or_empty();
        Ok(store)
    }

    /// Construct over an explicit backend. Used by tests and by callers that
    /// manage their own connector.
    pub fn with_backend(backend: Box<dyn SheetBackend>, policy: DuplicatePolicy) -> Self {
        Self {
            backend,
            policy,
            directory: Directory::default(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    // ---------------------------------------------------------------------------
    // Refresh / save
    // ---------------------------------------------------------------------------

    /// Whole-table re-read. Strict: any backend failure is returned and the
    /// cache keeps its previous contents.
    pub fn refresh(&mut self) -> Result<()> {
        let records = self.backend.read_all()?;
        self.directory = Directory::new(records);
        Ok(())
    }

    /// Re-read for display paths. An unreachable sheet degrades to an empty
    /// table so the form still renders; the failure is logged, not shown.
    pub fn refresh_or_empty(&mut self) {
        match self.backend.read_all() {
            Ok(records) => self.directory = Directory::new(records),
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "sheet unreachable, serving empty directory");
                self.directory = Directory::default();
            }
            Err(e) => {
                tracing::error!(error = %e, "directory read failed, serving empty directory");
                self.directory = Directory::default();
            }
        }
    }

    /// Whole-table write-back of the cached directory.
    pub fn save(&self) -> Result<()> {
        self.backend.write_all(&self.directory.records)
    }

    // ---------------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------------

    pub fn find_occupant(&self, key: &UnitKey) -> Option<&str> {
        self.directory.find_occupant(key, self.policy)
    }

    pub fn records(&self) -> &[DirectoryRecord] {
        &self.directory.records
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------
    //
    // Each mutation re-reads strictly before modifying: a dead connection
    // must fail the command rather than write an empty table over live data.

    pub fn upsert(&mut self, key: UnitKey, occupant: impl Into<String>) -> Result<()> {
        self.refresh()?;
        self.directory.upsert(key, occupant);
        self.save()
    }

    /// Legacy deletion by displayed occupant name. Removes every matching
    /// record across all units; returns how many went.
    pub fn remove_by_name(&mut self, name: &str) -> Result<usize> {
        self.refresh()?;
        let removed = self.directory.remove_by_name(name);
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn remove_by_key(&mut self, key: &UnitKey) -> Result<usize> {
        self.refresh()?;
        let removed = self.directory.remove_by_key(key);
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImmoError;
    use crate::sheet::FileSheet;
    use tempfile::TempDir;

    struct DeadSheet;

    impl SheetBackend for DeadSheet {
        fn read_all(&self) -> Result<Vec<DirectoryRecord>> {
            Err(ImmoError::SheetUnavailable("connection refused".into()))
        }
        fn write_all(&self, _records: &[DirectoryRecord]) -> Result<()> {
            Err(ImmoError::SheetUnavailable("connection refused".into()))
        }
    }

    fn file_store(dir: &TempDir) -> DirectoryStore {
        let backend = FileSheet::new(dir.path().join("directory.yaml"));
        let mut store = DirectoryStore::with_backend(Box::new(backend), DuplicatePolicy::Last);
        store.refresh().unwrap();
        store
    }

    fn key(property: &str, building: Option<&str>, unit: &str) -> UnitKey {
        UnitKey::new(property, building.map(String::from), unit)
    }

    #[test]
    fn upsert_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = file_store(&dir);
        store.upsert(key("Canterane", Some("A"), "10"), "Jean").unwrap();

        // Reopen over the same mirror file: the write survived.
        let store2 = file_store(&dir);
        assert_eq!(
            store2.find_occupant(&key("Canterane", Some("A"), "10")),
            Some("Jean")
        );
    }

    #[test]
    fn table_round_trips_as_key_occupant_pairs() {
        let dir = TempDir::new().unwrap();
        let mut store = file_store(&dir);
        store.upsert(key("Canterane", Some("A"), "10"), "Jean").unwrap();
        store.upsert(key("Canterane", Some("B"), "10"), "Sam").unwrap();
        store.upsert(key("Les Glycines", None, "3"), "").unwrap();

        let mut store2 = file_store(&dir);
        store2.refresh().unwrap();
        let mut written: Vec<_> = store.records().to_vec();
        let mut read: Vec<_> = store2.records().to_vec();
        written.sort_by(|a, b| a.to_row().cmp(&b.to_row()));
        read.sort_by(|a, b| a.to_row().cmp(&b.to_row()));
        assert_eq!(written, read);
    }

    #[test]
    fn second_upsert_wins_after_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = file_store(&dir);
        store.upsert(key("Canterane", Some("A"), "10"), "Lolo").unwrap();
        store.upsert(key("Canterane", Some("A"), "10"), "Jean").unwrap();

        let store2 = file_store(&dir);
        assert_eq!(store2.records().len(), 1);
        assert_eq!(
            store2.find_occupant(&key("Canterane", Some("A"), "10")),
            Some("Jean")
        );
    }

    #[test]
    fn remove_by_name_collateral_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = file_store(&dir);
        store.upsert(key("Canterane", Some("A"), "10"), "Sam").unwrap();
        store.upsert(key("Canterane", Some("B"), "10"), "Sam").unwrap();

        assert_eq!(store.remove_by_name("Sam").unwrap(), 2);
        let store2 = file_store(&dir);
        assert!(store2.records().is_empty());
    }

    #[test]
    fn remove_unknown_name_is_zero_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = file_store(&dir);
        assert_eq!(store.remove_by_name("Nobody").unwrap(), 0);
        assert!(!dir.path().join("directory.yaml").exists());
    }

    #[test]
    fn dead_sheet_reads_as_empty_table() {
        let mut store = DirectoryStore::with_backend(Box::new(DeadSheet), DuplicatePolicy::Last);
        store.refresh_or_empty();
        assert!(store.directory().is_empty());
    }

    #[test]
    fn dead_sheet_blocks_mutation() {
        let mut store = DirectoryStore::with_backend(Box::new(DeadSheet), DuplicatePolicy::Last);
        let err = store
            .upsert(key("Canterane", Some("A"), "10"), "Jean")
            .unwrap_err();
        assert!(err.is_connectivity());
    }

    #[test]
    fn policy_is_applied_to_lookups() {
        let dir = TempDir::new().unwrap();
        // Seed the mirror with a duplicate key, as a raw sheet import can.
        let backend = FileSheet::new(dir.path().join("directory.yaml"));
        backend
            .write_all(&[
                DirectoryRecord::new(key("Canterane", Some("A"), "10"), "Early"),
                DirectoryRecord::new(key("Canterane", Some("A"), "10"), "Late"),
            ])
            .unwrap();

        let mut first = DirectoryStore::with_backend(
            Box::new(FileSheet::new(dir.path().join("directory.yaml"))),
            DuplicatePolicy::First,
        );
        first.refresh().unwrap();
        assert_eq!(
            first.find_occupant(&key("Canterane", Some("A"), "10")),
            Some("Early")
        );

        let mut last = DirectoryStore::with_backend(
            Box::new(FileSheet::new(dir.path().join("directory.yaml"))),
            DuplicatePolicy::Last,
        );
        last.refresh().unwrap();
        assert_eq!(
            last.find_occupant(&key("Canterane", Some("A"), "10")),
            Some("Late")
        );
    }
}
