//! In-process storage with Web Storage semantics

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{KeyValueStorage, Result, StorageError};

/// Shared in-memory key-value map.
///
/// Clones share the same underlying map, the way two handles on
/// `localStorage` see the same origin data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<BTreeMap<String, String>>>,
    quota_bytes: Option<usize>,
    read_only: Arc<RwLock<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes pushing the total size past `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail, for exercising failure paths
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.write() = read_only;
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if *self.read_only.read() {
            return Err(StorageError::Unavailable(format!(
                "storage is read-only, cannot write {key}"
            )));
        }

        let mut items = self.items.write();
        if let Some(quota) = self.quota_bytes {
            let current: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if current + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if *self.read_only.read() {
            return Err(StorageError::Unavailable(format!(
                "storage is read-only, cannot remove {key}"
            )));
        }
        self.items.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_items() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("saved-charts", "[]").unwrap();
        assert_eq!(other.get_item("saved-charts").unwrap().as_deref(), Some("[]"));
        assert!(other.has_item("saved-charts").unwrap());

        other.remove_item("saved-charts").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let storage = MemoryStorage::with_quota(16);
        storage.set_item("k", "0123456789").unwrap();

        let err = storage.set_item("k2", "0123456789").unwrap_err();
        assert_eq!(err, StorageError::QuotaExceeded { key: "k2".into() });

        // Overwriting an existing key only counts the new value
        storage.set_item("k", "012345678901234").unwrap();
        assert!(storage.set_item("k", "0123456789012345").is_err());
        assert_eq!(
            storage.get_item("k").unwrap().as_deref(),
            Some("012345678901234")
        );
    }

    #[test]
    fn test_read_only_blocks_writes() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.set_read_only(true);

        assert!(storage.set_item("a", "2").is_err());
        assert!(storage.remove_item("a").is_err());
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
    }
}
