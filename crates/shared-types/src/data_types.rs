//! Persisted entities: charts with their store flags, and categories

use serde::{Deserialize, Serialize};

use crate::chart_config::Chart;
use crate::now_iso;

/// A chart as it lives in storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredChart {
    #[serde(flatten)]
    pub chart: Chart,
    /// Category ids; behaves as an insertion-ordered set
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    /// Soft delete marker. Deleted charts stay in storage but are left out
    /// of listings and backups.
    #[serde(default)]
    pub deleted: bool,
}

impl StoredChart {
    pub fn new(chart: Chart) -> Self {
        Self {
            chart,
            categories: Vec::new(),
            favorite: false,
            deleted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.chart.id
    }

    pub fn title(&self) -> &str {
        &self.chart.title
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c == category_id)
    }

    /// Add a category reference. Returns false if it was already present.
    pub fn add_category(&mut self, category_id: &str) -> bool {
        if self.has_category(category_id) {
            return false;
        }
        self.categories.push(category_id.to_string());
        true
    }

    /// Drop a category reference. Returns true if it was present.
    pub fn remove_category(&mut self, category_id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != category_id);
        self.categories.len() != before
    }

    /// Remove repeated category ids, keeping the first occurrence
    pub fn dedup_categories(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.categories.retain(|c| seen.insert(c.clone()));
    }

    pub fn touch(&mut self) {
        self.chart.updated_at = now_iso();
    }
}

impl From<Chart> for StoredChart {
    fn from(chart: Chart) -> Self {
        Self::new(chart)
    }
}

/// A user-defined label for grouping charts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartCategory {
    pub id: String,
    pub name: String,
    #[serde(default = "now_iso")]
    pub created_at: String,
    #[serde(default = "now_iso")]
    pub updated_at: String,
}

impl ChartCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("category id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err(format!("category '{}' has an empty name", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_chart_flattens_definition() {
        let mut stored = StoredChart::new(Chart::new("c1", "Education"));
        stored.add_category("cat-1");
        stored.favorite = true;

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], json!("c1"));
        assert_eq!(value["title"], json!("Education"));
        assert_eq!(value["categories"], json!(["cat-1"]));
        assert_eq!(value["favorite"], json!(true));
        assert_eq!(value["deleted"], json!(false));
        assert!(value.get("chart").is_none());
    }

    #[test]
    fn test_store_flags_default_when_missing() {
        let stored: StoredChart = serde_json::from_value(json!({
            "id": "c1",
            "config": { "chartType": "line" }
        }))
        .unwrap();

        assert!(!stored.favorite);
        assert!(!stored.deleted);
        assert!(stored.categories.is_empty());
    }

    #[test]
    fn test_category_set_operations() {
        let mut stored = StoredChart::new(Chart::new("c1", ""));
        assert!(stored.add_category("a"));
        assert!(!stored.add_category("a"));
        assert!(stored.add_category("b"));
        assert!(stored.remove_category("a"));
        assert!(!stored.remove_category("a"));
        assert_eq!(stored.categories, vec!["b".to_string()]);

        stored.categories = vec!["x".into(), "y".into(), "x".into()];
        stored.dedup_categories();
        assert_eq!(stored.categories, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_category_validation() {
        assert!(ChartCategory::new("cat-1", "Health").validate().is_ok());
        assert!(ChartCategory::new("cat-1", "   ").validate().is_err());
        assert!(ChartCategory::new("", "Health").validate().is_err());
    }
}
