//! Backup export

use charts_shared::{now_iso, ChartsBackupFile, ChartsResult};
use chrono::{DateTime, Utc};
use wasm_storage::KeyValueStorage;

use crate::ChartsStore;

impl<S: KeyValueStorage> ChartsStore<S> {
    /// Snapshot of every non-deleted chart and every category, in stored
    /// order. Does not touch storage.
    pub fn create_backup(&self) -> ChartsBackupFile {
        let charts = self
            .storage
            .load_charts()
            .into_iter()
            .filter(|c| !c.deleted)
            .collect();
        let categories = self.storage.load_categories();

        let mut backup = ChartsBackupFile::new(charts, categories, now_iso());
        backup.version = self.config.backup.version;
        log::debug!(
            "Created backup with {} charts and {} categories",
            backup.charts.len(),
            backup.categories.len()
        );
        backup
    }

    /// Serialize a backup the way the download is written
    pub fn backup_to_json(&self, backup: &ChartsBackupFile) -> ChartsResult<String> {
        let json = if self.config.backup.pretty {
            serde_json::to_string_pretty(backup)?
        } else {
            serde_json::to_string(backup)?
        };
        Ok(json)
    }

    /// Download name for a backup taken at `at`
    pub fn backup_file_name(&self, at: DateTime<Utc>) -> String {
        backup_file_name(&self.config.backup.file_prefix, at)
    }
}

/// `<prefix>-<ISO timestamp with ':' and '.' replaced by '-'>.json`
pub fn backup_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    let timestamp = at
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{prefix}-{timestamp}.json")
}
