//! Import funnel shared by file upload and clipboard paste
//!
//! Reading the file or the clipboard is the caller's asynchronous step;
//! once the text is in hand everything here is synchronous. A backup with
//! no conflicts is applied right away with `skip`; otherwise the validated
//! backup is handed back so the user can pick a strategy.

use charts_shared::{
    ChartsBackupFile, ChartsError, ChartsResult, ConflictStrategy, ImportPreview, ImportResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_storage::KeyValueStorage;

use crate::ChartsStore;

/// Where the backup text came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    /// A user-selected `.json` file; anything unusable is an error
    File,
    /// Pasted text; anything that is not a backup is ignored
    Clipboard,
}

/// A validated backup waiting for the user's conflict strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingImport {
    pub backup: ChartsBackupFile,
    pub preview: ImportPreview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// No conflicts, imported with `skip`
    Applied(ImportResult),
    NeedsResolution(PendingImport),
}

/// Element that had focus when a paste happened
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasteTarget {
    pub tag_name: String,
    #[serde(default)]
    pub content_editable: bool,
}

impl PasteTarget {
    /// Pastes into editable controls belong to the control, not to import
    pub fn is_text_editing(&self) -> bool {
        self.content_editable
            || self.tag_name.eq_ignore_ascii_case("INPUT")
            || self.tag_name.eq_ignore_ascii_case("TEXTAREA")
    }
}

/// Whether a paste should be offered to the import funnel
pub fn should_handle_paste(target: Option<&PasteTarget>, text: &str) -> bool {
    if target.map_or(false, PasteTarget::is_text_editing) {
        return false;
    }
    text.trim().len() >= 2
}

impl<S: KeyValueStorage> ChartsStore<S> {
    /// Run backup text through validation and preview, auto-applying when
    /// nothing conflicts. `Ok(None)` means clipboard text that was not a
    /// backup and was ignored.
    pub fn stage_import(&self, text: &str, source: ImportSource) -> ChartsResult<Option<ImportOutcome>> {
        let raw: Value = match serde_json::from_str(text) {
            Ok(raw) => raw,
            Err(err) => {
                return match source {
                    ImportSource::Clipboard => Ok(None),
                    ImportSource::File => Err(ChartsError::invalid_backup(
                        format!("not valid JSON: {err}"),
                        None,
                    )),
                }
            }
        };

        let (backup, preview) = match self.preview_import(&raw) {
            Ok(staged) => staged,
            Err(err @ ChartsError::InvalidBackup { .. }) => {
                return match source {
                    ImportSource::Clipboard => {
                        log::debug!("Ignoring pasted JSON that is not a backup: {err}");
                        Ok(None)
                    }
                    ImportSource::File => Err(err),
                }
            }
            Err(err) => return Err(err),
        };

        if preview.has_conflicts() {
            log::debug!(
                "Import from {source:?} has {} conflicts, waiting for a strategy",
                preview.conflicts.len()
            );
            return Ok(Some(ImportOutcome::NeedsResolution(PendingImport {
                backup,
                preview,
            })));
        }

        let result = self.import_backup(&backup, ConflictStrategy::Skip)?;
        Ok(Some(ImportOutcome::Applied(result)))
    }

    /// Apply a pending import with the chosen strategy
    pub fn resolve_pending(
        &self,
        pending: &PendingImport,
        strategy: ConflictStrategy,
    ) -> ChartsResult<ImportResult> {
        self.import_backup(&pending.backup, strategy)
    }

    /// Clipboard entry point: honours the focus rule, then stages the text
    pub fn handle_paste(
        &self,
        target: Option<&PasteTarget>,
        text: &str,
    ) -> ChartsResult<Option<ImportOutcome>> {
        if !should_handle_paste(target, text) {
            return Ok(None);
        }
        self.stage_import(text, ImportSource::Clipboard)
    }
}
