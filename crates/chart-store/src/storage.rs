//! Storage adapter: chart and category lists as JSON arrays under two keys
//!
//! Reads never fail. A missing key reads as an empty list; unparseable or
//! non-array data is logged as corruption and also reads as empty; single
//! malformed entries are dropped with a warning so one bad record cannot
//! hide the rest.

use charts_shared::{ChartCategory, ChartsError, ChartsResult, StoredChart};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use wasm_storage::{KeyValueStorage, StorageError};

pub struct ChartsStorage<S: KeyValueStorage> {
    backend: S,
    charts_key: String,
    categories_key: String,
}

impl<S: KeyValueStorage> ChartsStorage<S> {
    pub fn new(backend: S, charts_key: &str, categories_key: &str) -> Self {
        Self {
            backend,
            charts_key: charts_key.to_string(),
            categories_key: categories_key.to_string(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn charts_key(&self) -> &str {
        &self.charts_key
    }

    pub fn categories_key(&self) -> &str {
        &self.categories_key
    }

    /// All persisted charts, soft-deleted ones included, in stored order
    pub fn load_charts(&self) -> Vec<StoredChart> {
        self.load_list(&self.charts_key, |chart: &StoredChart| {
            chart.chart.validate()?;
            Ok(chart.id().to_string())
        })
        .into_iter()
        .map(|mut chart| {
            chart.dedup_categories();
            chart
        })
        .collect()
    }

    /// All persisted categories in stored order
    pub fn load_categories(&self) -> Vec<ChartCategory> {
        self.load_list(&self.categories_key, |category: &ChartCategory| {
            category.validate()?;
            Ok(category.id.clone())
        })
    }

    pub fn save_charts(&self, charts: &[StoredChart]) -> ChartsResult<()> {
        let json = to_json(charts)?;
        self.backend
            .set_item(&self.charts_key, &json)
            .map_err(storage_error)
    }

    pub fn save_categories(&self, categories: &[ChartCategory]) -> ChartsResult<()> {
        let json = to_json(categories)?;
        self.backend
            .set_item(&self.categories_key, &json)
            .map_err(storage_error)
    }

    /// Write both lists. If the second write fails the first key is put
    /// back to its previous raw value, so readers never observe one list
    /// updated without the other.
    pub fn save_all(&self, charts: &[StoredChart], categories: &[ChartCategory]) -> ChartsResult<()> {
        let charts_json = to_json(charts)?;
        let categories_json = to_json(categories)?;

        let previous_categories = self
            .backend
            .get_item(&self.categories_key)
            .map_err(storage_error)?;

        self.backend
            .set_item(&self.categories_key, &categories_json)
            .map_err(storage_error)?;

        if let Err(err) = self.backend.set_item(&self.charts_key, &charts_json) {
            log::error!(
                "Writing {} failed, restoring {}: {}",
                self.charts_key,
                self.categories_key,
                err
            );
            let restored = match previous_categories {
                Some(raw) => self.backend.set_item(&self.categories_key, &raw),
                None => self.backend.remove_item(&self.categories_key),
            };
            if let Err(restore_err) = restored {
                log::error!("Failed to restore {}: {}", self.categories_key, restore_err);
            }
            return Err(storage_error(err));
        }

        Ok(())
    }

    fn load_list<T, F>(&self, key: &str, identify: F) -> Vec<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Result<String, String>,
    {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::error!("Failed to read {key} from storage: {err}");
                return Vec::new();
            }
        };

        let entries = match parse_array(key, &raw) {
            Ok(entries) => entries,
            Err(err) => {
                log::error!("{err}; treating it as empty");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let item: T = match serde_json::from_value(entry) {
                Ok(item) => item,
                Err(err) => {
                    log::warn!("Discarding invalid entry {key}[{index}]: {err}");
                    continue;
                }
            };
            match identify(&item) {
                Ok(id) if seen.insert(id.clone()) => items.push(item),
                Ok(id) => log::warn!("Discarding duplicate id {id} at {key}[{index}]"),
                Err(reason) => log::warn!("Discarding invalid entry {key}[{index}]: {reason}"),
            }
        }

        log::debug!("Loaded {} entries from {key}", items.len());
        items
    }
}

fn parse_array(key: &str, raw: &str) -> ChartsResult<Vec<Value>> {
    let corruption = |message: String| ChartsError::StorageCorruption {
        key: key.to_string(),
        message,
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(other) => Err(corruption(format!(
            "expected a JSON array, found {}",
            json_type_name(&other)
        ))),
        Err(err) => Err(corruption(err.to_string())),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> ChartsResult<String> {
    serde_json::to_string(value).map_err(ChartsError::from)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn storage_error(err: StorageError) -> ChartsError {
    ChartsError::Storage {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charts_shared::Chart;
    use serde_json::json;
    use wasm_storage::MemoryStorage;

    fn storage() -> (MemoryStorage, ChartsStorage<MemoryStorage>) {
        let backend = MemoryStorage::new();
        let storage = ChartsStorage::new(backend.clone(), "saved-charts", "chart-categories");
        (backend, storage)
    }

    #[test]
    fn test_missing_keys_load_empty() {
        let (_, storage) = storage();
        assert!(storage.load_charts().is_empty());
        assert!(storage.load_categories().is_empty());
    }

    #[test]
    fn test_corrupt_json_loads_empty() {
        let (backend, storage) = storage();
        backend.set_item("saved-charts", "invalid json").unwrap();
        backend.set_item("chart-categories", r#"{"id":"x"}"#).unwrap();

        assert!(storage.load_charts().is_empty());
        assert!(storage.load_categories().is_empty());
    }

    #[test]
    fn test_invalid_entries_are_dropped_individually() {
        let (backend, storage) = storage();
        let valid = StoredChart::new(Chart::new("valid", "Valid"));
        let raw = json!([valid, { "id": "invalid" }, { "id": "", "config": { "chartType": "line" } }]);
        backend.set_item("saved-charts", &raw.to_string()).unwrap();

        let charts = storage.load_charts();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].id(), "valid");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let (backend, storage) = storage();
        let first = StoredChart::new(Chart::new("a", "First"));
        let second = StoredChart::new(Chart::new("a", "Second"));
        backend
            .set_item("saved-charts", &json!([first, second]).to_string())
            .unwrap();

        let charts = storage.load_charts();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].title(), "First");
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let (_, storage) = storage();
        let charts: Vec<StoredChart> = ["c", "a", "b"]
            .iter()
            .map(|id| StoredChart::new(Chart::new(*id, "")))
            .collect();
        storage.save_charts(&charts).unwrap();

        let ids: Vec<String> = storage.load_charts().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_save_all_restores_categories_when_charts_write_fails() {
        let backend = MemoryStorage::with_quota(600);
        let storage = ChartsStorage::new(backend.clone(), "saved-charts", "chart-categories");
        storage
            .save_categories(&[ChartCategory::new("cat-1", "Health")])
            .unwrap();
        let before = backend.get_item("chart-categories").unwrap();

        let mut big = Chart::new("big", "x".repeat(1_000));
        big.description = Some("too large for the quota".into());
        let result = storage.save_all(
            &[StoredChart::new(big)],
            &[ChartCategory::new("cat-2", "Roads")],
        );

        assert!(matches!(result, Err(ChartsError::Storage { .. })));
        assert_eq!(backend.get_item("chart-categories").unwrap(), before);
        assert!(backend.get_item("saved-charts").unwrap().is_none());
    }
}
