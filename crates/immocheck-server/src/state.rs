use immocheck_core::config::Config;
use immocheck_core::store::DirectoryStore;
use immocheck_core::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state passed to all route handlers.
///
/// The store is the process-wide repository handle: one cached directory,
/// refreshed only through the explicit refresh endpoint or by mutations.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    store: Arc<Mutex<DirectoryStore>>,
}

impl AppState {
    pub fn new(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let store = DirectoryStore::open(root, &config)?;
        Ok(Self {
            root: root.to_path_buf(),
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        })
    }

    /// Lock the shared store. A poisoned lock only means a panicking
    /// handler died mid-request; the cached table itself stays usable.
    pub fn store(&self) -> MutexGuard<'_, DirectoryStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}
