//! Configuration validation utilities

use crate::{BackupConfig, ConfigError, Result, StorageBackend, StorageConfig, StoreConfig};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &StoreConfig) -> Result<()> {
        Self::validate_storage(&config.storage)?;
        Self::validate_backup(&config.backup)?;
        Ok(())
    }

    fn validate_storage(storage: &StorageConfig) -> Result<()> {
        if storage.charts_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Charts storage key cannot be empty".to_string(),
            ));
        }

        if storage.categories_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Categories storage key cannot be empty".to_string(),
            ));
        }

        // Both lists would overwrite each other
        if storage.charts_key == storage.categories_key {
            return Err(ConfigError::Validation(format!(
                "Charts and categories must use different storage keys, both are '{}'",
                storage.charts_key
            )));
        }

        if storage.backend == StorageBackend::Session {
            log::warn!("Session storage is cleared when the tab closes; charts will not persist");
        }

        Ok(())
    }

    fn validate_backup(backup: &BackupConfig) -> Result<()> {
        if backup.version == 0 {
            return Err(ConfigError::Validation(
                "Invalid backup version: 0. Versions start at 1".to_string(),
            ));
        }

        let prefix = backup.file_prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Validation(
                "Backup file prefix cannot be empty".to_string(),
            ));
        }

        if prefix.contains(['/', '\\', ':']) {
            return Err(ConfigError::Validation(format!(
                "Invalid backup file prefix '{}': path separators are not allowed",
                prefix
            )));
        }

        Ok(())
    }
}
