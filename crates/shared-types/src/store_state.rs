// Backup document and import report structures shared with the UI.
// Field names mirror the JSON the chart list page reads and writes.

use serde::{Deserialize, Serialize};

use crate::data_types::{ChartCategory, StoredChart};

/// Marker written into the `type` field of every backup
pub const BACKUP_TYPE: &str = "charts-backup";

/// Backup format version produced by this crate
pub const BACKUP_VERSION: u32 = 1;

/// Portable snapshot of the charts store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartsBackupFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    #[serde(alias = "exportedAt")]
    pub created_at: String,
    pub charts: Vec<StoredChart>,
    pub categories: Vec<ChartCategory>,
}

impl ChartsBackupFile {
    pub fn new(charts: Vec<StoredChart>, categories: Vec<ChartCategory>, created_at: String) -> Self {
        Self {
            kind: BACKUP_TYPE.to_string(),
            version: BACKUP_VERSION,
            created_at,
            charts,
            categories,
        }
    }
}

/// How to treat an imported chart whose id is already stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Keep the stored chart, drop the imported one
    #[default]
    Skip,
    /// Overwrite the stored chart with the imported one
    Replace,
    /// Store the imported chart under a fresh id
    KeepBoth,
}

impl std::fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictStrategy::Skip => write!(f, "skip"),
            ConflictStrategy::Replace => write!(f, "replace"),
            ConflictStrategy::KeepBoth => write!(f, "keep-both"),
        }
    }
}

impl std::str::FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(ConflictStrategy::Skip),
            "replace" => Ok(ConflictStrategy::Replace),
            "keep-both" => Ok(ConflictStrategy::KeepBoth),
            other => Err(format!("Unknown conflict strategy: {other}")),
        }
    }
}

/// An imported chart whose id is already taken
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportConflict {
    pub id: String,
    pub current_title: String,
    pub imported_title: String,
}

/// Read-only diff of a backup against the current store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub total_charts: usize,
    pub unique: usize,
    pub conflicts: Vec<ImportConflict>,
    pub total_categories: usize,
    pub categories_new: usize,
    pub categories_matched_by_name: usize,
}

impl ImportPreview {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Counts produced by applying an import
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub added: usize,
    pub replaced: usize,
    pub duplicated: usize,
    pub skipped: usize,
    pub categories_added: usize,
    pub categories_merged: usize,
}

impl ImportResult {
    /// Notification text shown after an import
    pub fn summary(&self) -> String {
        let parts: Vec<String> = [
            (self.added, "added"),
            (self.replaced, "replaced"),
            (self.duplicated, "duplicated"),
            (self.skipped, "skipped"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();

        if parts.is_empty() {
            "Import complete".to_string()
        } else {
            format!("Import complete: {}", parts.join(", "))
        }
    }
}
