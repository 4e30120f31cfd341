//! Shared fixtures for the charts store integration tests

#![allow(dead_code)]

use charts_store::charts_shared::{
    Chart, ChartCategory, ChartsBackupFile, SeriesConfiguration, StoredChart,
};
use charts_store::wasm_storage::{KeyValueStorage, MemoryStorage};
use charts_store::ChartsStore;
use serde_json::json;

pub const CHARTS_KEY: &str = "saved-charts";
pub const CATEGORIES_KEY: &str = "chart-categories";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fresh store plus a handle on its backing map
pub fn store() -> (MemoryStorage, ChartsStore<MemoryStorage>) {
    init_logging();
    let backend = MemoryStorage::new();
    (backend.clone(), ChartsStore::new(backend))
}

pub fn chart(id: &str, title: &str) -> Chart {
    let mut chart = Chart::new(id, title);
    chart.series.push(
        serde_json::from_value::<SeriesConfiguration>(json!({
            "id": format!("{id}-series"),
            "label": "Spending",
            "filter": { "years": [2023, 2024], "account_category": "ch" }
        }))
        .unwrap(),
    );
    chart
}

pub fn stored(id: &str, title: &str) -> StoredChart {
    StoredChart::new(chart(id, title))
}

pub fn stored_with(id: &str, title: &str, categories: &[&str]) -> StoredChart {
    let mut stored = stored(id, title);
    stored.categories = categories.iter().map(|c| c.to_string()).collect();
    stored
}

pub fn category(id: &str, name: &str) -> ChartCategory {
    ChartCategory::new(id, name)
}

pub fn backup(charts: Vec<StoredChart>, categories: Vec<ChartCategory>) -> ChartsBackupFile {
    ChartsBackupFile::new(charts, categories, "2024-06-01T12:00:00.000Z".to_string())
}

/// Write charts straight into storage, bypassing the store
pub fn seed_charts(backend: &MemoryStorage, charts: &[StoredChart]) {
    backend
        .set_item(CHARTS_KEY, &serde_json::to_string(charts).unwrap())
        .unwrap();
}

pub fn seed_categories(backend: &MemoryStorage, categories: &[ChartCategory]) {
    backend
        .set_item(CATEGORIES_KEY, &serde_json::to_string(categories).unwrap())
        .unwrap();
}

/// Raw stored chart list as JSON
pub fn raw_charts(backend: &MemoryStorage) -> serde_json::Value {
    let raw = backend.get_item(CHARTS_KEY).unwrap().unwrap_or_else(|| "[]".into());
    serde_json::from_str(&raw).unwrap()
}

pub fn raw_categories(backend: &MemoryStorage) -> serde_json::Value {
    let raw = backend
        .get_item(CATEGORIES_KEY)
        .unwrap()
        .unwrap_or_else(|| "[]".into());
    serde_json::from_str(&raw).unwrap()
}
