//! Persistent store for user-authored charts and their categories
//!
//! `ChartsStore` owns a key-value backend and exposes chart editing,
//! category management, and backup export/import with conflict
//! resolution. Every mutating operation runs its load, mutate and save
//! steps under one write guard, so a burst of UI events cannot interleave
//! a read of stale data with a later write.

use charts_config::{ConfigValidator, NameMatch, StoreConfig};
use charts_shared::{ChartsError, ChartsResult};
use parking_lot::{Mutex, MutexGuard};
use wasm_storage::KeyValueStorage;

pub mod backup;
pub mod categories;
pub mod charts;
pub mod import;
pub mod session;
pub mod storage;

pub use charts::ChartQuery;
pub use session::{ImportOutcome, ImportSource, PasteTarget, PendingImport};
pub use storage::ChartsStorage;

pub use charts_config;
pub use charts_shared;
pub use wasm_storage;

/// Chart and category store over a key-value backend
pub struct ChartsStore<S: KeyValueStorage> {
    storage: ChartsStorage<S>,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStorage> ChartsStore<S> {
    /// Create a store with the default configuration
    pub fn new(backend: S) -> Self {
        Self::from_parts(backend, StoreConfig::default())
    }

    /// Create a store with a validated configuration
    pub fn with_config(backend: S, config: StoreConfig) -> ChartsResult<Self> {
        ConfigValidator::validate(&config).map_err(|e| ChartsError::validation(e.to_string()))?;
        Ok(Self::from_parts(backend, config))
    }

    fn from_parts(backend: S, config: StoreConfig) -> Self {
        let storage = ChartsStorage::new(
            backend,
            &config.storage.charts_key,
            &config.storage.categories_key,
        );
        Self {
            storage,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Direct access to the storage adapter
    pub fn storage(&self) -> &ChartsStorage<S> {
        &self.storage
    }

    pub(crate) fn name_match(&self) -> NameMatch {
        self.config.categories.name_match
    }

    /// Guard held across a load-mutate-save sequence
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }
}

/// Fresh random identifier for charts and categories
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fresh identifier that is not accepted by `taken`
pub(crate) fn unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = new_id();
        if !taken(&id) {
            return id;
        }
    }
}
