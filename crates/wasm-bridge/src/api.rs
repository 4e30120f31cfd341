//! Plain-Rust half of the bridge: option parsing and result shapes that
//! cross into JavaScript. Nothing here touches `JsValue`, so it is tested
//! natively.

use charts_store::charts_config::{ConfigError, ConfigFormat, StorageBackend, StoreConfig};
use charts_store::charts_shared::{
    ChartsError, ChartsResult, ConflictStrategy, ErrorResponse, ImportPreview, ImportResult,
};
use charts_store::wasm_storage::{KeyValueStorage, MemoryStorage, SimpleStorage};
use charts_store::{ChartQuery, ImportOutcome, ImportSource};
use serde::{Deserialize, Serialize};

pub type Backend = Box<dyn KeyValueStorage>;

/// Listing options as sent from JavaScript
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOptions {
    pub include_deleted: bool,
    pub sort: bool,
    pub favorites_only: bool,
    pub category: Option<String>,
}

impl From<ListOptions> for ChartQuery {
    fn from(options: ListOptions) -> Self {
        ChartQuery {
            include_deleted: options.include_deleted,
            sort: options.sort,
            favorites_only: options.favorites_only,
            category: options.category,
        }
    }
}

/// What the UI should do after handing over backup text
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportStatus {
    /// Not a backup; nothing happened
    Ignored,
    Applied {
        result: ImportResult,
        message: String,
    },
    /// Show the conflict dialog, then call `resolveImport`
    NeedsResolution { preview: ImportPreview },
}

impl From<Option<&ImportOutcome>> for ImportStatus {
    fn from(outcome: Option<&ImportOutcome>) -> Self {
        match outcome {
            None => ImportStatus::Ignored,
            Some(ImportOutcome::Applied(result)) => ImportStatus::applied(*result),
            Some(ImportOutcome::NeedsResolution(pending)) => ImportStatus::NeedsResolution {
                preview: pending.preview.clone(),
            },
        }
    }
}

impl ImportStatus {
    pub fn applied(result: ImportResult) -> Self {
        ImportStatus::Applied {
            message: result.summary(),
            result,
        }
    }
}

/// Parse the optional configuration handed to the constructor. `format`
/// is `json` (default), `yaml` or `toml`.
pub fn parse_config(config: Option<&str>, format: Option<&str>) -> ChartsResult<StoreConfig> {
    let invalid = |e: ConfigError| ChartsError::validation(format!("Invalid store configuration: {e}"));

    let content = match config.map(str::trim) {
        None | Some("") => return Ok(StoreConfig::default()),
        Some(content) => content,
    };
    let format = match format {
        Some(name) => name.parse::<ConfigFormat>().map_err(invalid)?,
        None => ConfigFormat::Json,
    };
    StoreConfig::parse(content, format).map_err(invalid)
}

pub fn open_backend(backend: StorageBackend) -> Backend {
    match backend {
        StorageBackend::Local => Box::new(SimpleStorage::local()),
        StorageBackend::Session => Box::new(SimpleStorage::session()),
        StorageBackend::Memory => Box::new(MemoryStorage::new()),
    }
}

pub fn parse_source(source: &str) -> ChartsResult<ImportSource> {
    match source {
        "file" => Ok(ImportSource::File),
        "clipboard" => Ok(ImportSource::Clipboard),
        other => Err(ChartsError::validation_field(
            "source",
            format!("Unknown import source: {other}"),
        )),
    }
}

pub fn parse_strategy(strategy: &str) -> ChartsResult<ConflictStrategy> {
    strategy
        .parse()
        .map_err(|msg: String| ChartsError::validation_field("strategy", msg))
}

/// Error envelope serialized for JavaScript
pub fn error_json(error: ChartsError, operation: &str) -> String {
    if error.is_user_facing() {
        log::warn!("{operation} failed: {error}");
    } else {
        log::error!("{operation} failed: {error}");
    }
    ErrorResponse::new(error)
        .with_context("ChartsStore", operation)
        .to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use charts_store::charts_config::NameMatch;
    use charts_store::{ChartsStore, PendingImport};
    use serde_json::json;

    #[test]
    fn test_config_defaults_when_absent() {
        assert_eq!(parse_config(None, None).unwrap(), StoreConfig::default());
        assert_eq!(parse_config(Some("  "), Some("yaml")).unwrap(), StoreConfig::default());

        let config = parse_config(
            Some(r#"{"storage": {"backend": "memory"}, "categories": {"nameMatch": "case-sensitive"}}"#),
            None,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.categories.name_match, NameMatch::CaseSensitive);
        assert_eq!(config.storage.charts_key, "saved-charts");

        assert!(matches!(
            parse_config(Some("{not json"), None),
            Err(ChartsError::Validation { .. })
        ));
    }

    #[test]
    fn test_config_in_other_formats() {
        let yaml = parse_config(Some("storage:\n  backend: session\n"), Some("yml")).unwrap();
        assert_eq!(yaml.storage.backend, StorageBackend::Session);

        let toml = parse_config(Some("[backup]\nfilePrefix = \"budget\"\n"), Some("toml")).unwrap();
        assert_eq!(toml.backup.file_prefix, "budget");

        assert!(parse_config(Some("a = 1"), Some("ini")).is_err());
        // Validation runs on the parsed document
        assert!(parse_config(Some(r#"{"backup": {"version": 0}}"#), Some("json")).is_err());
    }

    #[test]
    fn test_list_options_map_onto_query() {
        let options: ListOptions =
            serde_json::from_value(json!({ "favoritesOnly": true, "category": "cat-1" })).unwrap();
        let query = ChartQuery::from(options);
        assert!(query.favorites_only);
        assert!(!query.include_deleted);
        assert_eq!(query.category.as_deref(), Some("cat-1"));
    }

    #[test]
    fn test_source_and_strategy_names() {
        assert_eq!(parse_source("file").unwrap(), ImportSource::File);
        assert_eq!(parse_source("clipboard").unwrap(), ImportSource::Clipboard);
        assert!(parse_source("drive").is_err());

        assert_eq!(parse_strategy("keep-both").unwrap(), ConflictStrategy::KeepBoth);
        assert!(matches!(
            parse_strategy("merge"),
            Err(ChartsError::Validation { .. })
        ));
    }

    #[test]
    fn test_import_status_shapes() {
        let ignored = serde_json::to_value(ImportStatus::from(None)).unwrap();
        assert_eq!(ignored, json!({ "status": "ignored" }));

        let applied = ImportStatus::applied(ImportResult {
            added: 2,
            ..ImportResult::default()
        });
        let value = serde_json::to_value(&applied).unwrap();
        assert_eq!(value["status"], json!("applied"));
        assert_eq!(value["result"]["added"], json!(2));
        assert_eq!(value["message"], json!("Import complete: 2 added"));
    }

    #[test]
    fn test_pending_import_reports_conflicts() {
        let store = ChartsStore::new(open_backend(StorageBackend::Memory));
        let backup = json!({
            "type": "charts-backup",
            "version": 1,
            "charts": [{ "id": "a", "title": "Imported", "config": { "chartType": "line" } }]
        })
        .to_string();

        store.stage_import(&backup, ImportSource::File).unwrap();
        let outcome = store.stage_import(&backup, ImportSource::File).unwrap();
        let pending: &PendingImport = match &outcome {
            Some(ImportOutcome::NeedsResolution(pending)) => pending,
            other => panic!("expected conflicts, got {other:?}"),
        };
        assert_eq!(pending.preview.conflicts.len(), 1);

        let value = serde_json::to_value(ImportStatus::from(outcome.as_ref())).unwrap();
        assert_eq!(value["status"], json!("needsResolution"));
        assert_eq!(value["preview"]["conflicts"][0]["id"], json!("a"));
    }

    #[test]
    fn test_error_json_envelope() {
        let json = error_json(ChartsError::chart_not_found("missing"), "getChart");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"]["type"], json!("NotFound"));
        assert_eq!(value["context"]["operation"], json!("getChart"));
    }
}
