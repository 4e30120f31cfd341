//! Key-value persistence backends for the charts store
//!
//! The store only needs string get/set/remove on a flat key space, which is
//! exactly what the browser's Web Storage offers. `SimpleStorage` talks to
//! `localStorage`/`sessionStorage`; `MemoryStorage` keeps the same contract
//! in process for native builds and tests.

use thiserror::Error;

pub mod memory;
pub mod simple;

pub use memory::MemoryStorage;
pub use simple::SimpleStorage;

/// Errors raised by a storage backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage not available: {0}")]
    Unavailable(String),

    #[error("JavaScript storage error: {0}")]
    Js(String),

    #[error("Storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Flat string key-value store with Web Storage semantics
pub trait KeyValueStorage {
    /// Read the raw value under `key`, `None` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write the raw value under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    fn has_item(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}
