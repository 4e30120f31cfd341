//! Authored chart definition: display configuration, series and annotations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::now_iso;

/// Chart types the chart builder can render
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Line,
    Bar,
    Area,
    BarAggr,
    PieAggr,
    TreemapAggr,
    SankeyAggr,
}

/// Global chart configuration that individual series may override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart_type: ChartType,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub show_data_labels: bool,
    #[serde(default = "default_true")]
    pub show_grid_lines: bool,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(default)]
    pub show_relative_values: bool,
    /// Display options this version does not model, kept for round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            color: default_color(),
            show_data_labels: false,
            show_grid_lines: true,
            show_legend: true,
            show_relative_values: false,
            extra: Map::new(),
        }
    }
}

/// Y axis a series is plotted against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum YAxisId {
    #[default]
    Left,
    Right,
}

/// Per-series overrides of the chart configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_data_labels: Option<bool>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub y_axis_id: YAxisId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            chart_type: None,
            color: None,
            show_data_labels: None,
            visible: true,
            y_axis_id: YAxisId::Left,
            extra: Map::new(),
        }
    }
}

/// Account category of budget line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Expenses
    #[default]
    Ch,
    /// Revenues
    Vn,
}

/// Amount bound, accepted either as a number or as a string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AmountBound {
    Number(f64),
    Text(String),
}

/// Analytics filter a series is bound to. Only the shape is checked here,
/// the query layer interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalyticsFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_cuis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economic_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(default)]
    pub account_category: AccountCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economic_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uat_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<AmountBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<AmountBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_uat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One data-bound sub-definition of a chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesConfiguration {
    pub id: String,
    #[serde(rename = "type", default = "default_series_type")]
    pub series_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub label: String,
    pub filter: AnalyticsFilter,
    #[serde(default)]
    pub filter_metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub config: SeriesConfig,
    #[serde(default = "now_iso")]
    pub created_at: String,
    #[serde(default = "now_iso")]
    pub updated_at: String,
}

/// Orientation of line and region annotations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Side of a threshold that is highlighted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdCondition {
    Above,
    Below,
}

/// Chart annotation, discriminated by its `type` key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    #[serde(rename_all = "camelCase")]
    Point {
        series_id: String,
        data_index: u32,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default = "default_annotation_color")]
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        orientation: Orientation,
        value: f64,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default = "default_annotation_color")]
        color: String,
        #[serde(default = "default_stroke_dasharray")]
        stroke_dasharray: String,
    },
    #[serde(rename_all = "camelCase")]
    Threshold {
        value: f64,
        condition: ThresholdCondition,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default = "default_threshold_color")]
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Region {
        start_value: f64,
        end_value: f64,
        orientation: Orientation,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default = "default_region_color")]
        color: String,
        #[serde(default = "default_region_opacity")]
        opacity: f64,
    },
}

impl Annotation {
    pub fn title(&self) -> &str {
        match self {
            Annotation::Point { title, .. }
            | Annotation::Line { title, .. }
            | Annotation::Threshold { title, .. }
            | Annotation::Region { title, .. } => title,
        }
    }
}

/// A user-authored visualization definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: ChartConfig,
    #[serde(default)]
    pub series: Vec<SeriesConfiguration>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default = "now_iso")]
    pub created_at: String,
    #[serde(default = "now_iso")]
    pub updated_at: String,
}

impl Chart {
    /// Create an empty line chart stamped with the current time
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            config: ChartConfig::default(),
            series: Vec::new(),
            annotations: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Structural checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("chart id cannot be empty".to_string());
        }
        if let Some(series) = self.series.iter().find(|s| s.id.trim().is_empty()) {
            return Err(format!("series '{}' has an empty id", series.label));
        }
        for annotation in &self.annotations {
            if let Annotation::Region { opacity, .. } = annotation {
                if !(0.0..=1.0).contains(opacity) {
                    return Err(format!(
                        "region annotation '{}' opacity {} is outside 0..=1",
                        annotation.title(),
                        opacity
                    ));
                }
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_color() -> String {
    "#0000ff".to_string()
}

fn default_series_type() -> String {
    "line-items-aggregated-yearly".to_string()
}

fn default_annotation_color() -> String {
    "#ff0000".to_string()
}

fn default_threshold_color() -> String {
    "#ffa500".to_string()
}

fn default_region_color() -> String {
    "#ffcccc".to_string()
}

fn default_stroke_dasharray() -> String {
    "5,5".to_string()
}

fn default_region_opacity() -> f64 {
    0.3
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chart_defaults_fill_missing_fields() {
        let chart: Chart = serde_json::from_value(json!({
            "id": "c1",
            "config": { "chartType": "bar-aggr" }
        }))
        .unwrap();

        assert_eq!(chart.title, "");
        assert_eq!(chart.config.chart_type, ChartType::BarAggr);
        assert_eq!(chart.config.color, "#0000ff");
        assert!(chart.config.show_grid_lines);
        assert!(chart.series.is_empty());
        assert!(!chart.created_at.is_empty());
    }

    #[test]
    fn test_unknown_display_options_survive() {
        let chart: Chart = serde_json::from_value(json!({
            "id": "c1",
            "config": { "chartType": "line", "showTooltip": true, "editAnnotations": false }
        }))
        .unwrap();

        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["config"]["showTooltip"], json!(true));
        assert_eq!(value["config"]["editAnnotations"], json!(false));
    }

    #[test]
    fn test_annotation_tagging() {
        let annotation: Annotation = serde_json::from_value(json!({
            "type": "threshold",
            "value": 100.0,
            "condition": "above",
            "title": "Cap"
        }))
        .unwrap();

        match &annotation {
            Annotation::Threshold { color, condition, .. } => {
                assert_eq!(color, "#ffa500");
                assert_eq!(*condition, ThresholdCondition::Above);
            }
            _ => panic!("Wrong annotation variant"),
        }
        assert_eq!(annotation.title(), "Cap");
    }

    #[test]
    fn test_unknown_chart_type_rejected() {
        let result: Result<Chart, _> = serde_json::from_value(json!({
            "id": "c1",
            "config": { "chartType": "radar" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_series_filter_amount_accepts_text_or_number() {
        let series: SeriesConfiguration = serde_json::from_value(json!({
            "id": "s1",
            "filter": { "min_amount": "1000", "max_amount": 5000, "account_category": "vn" }
        }))
        .unwrap();

        assert_eq!(series.filter.min_amount, Some(AmountBound::Text("1000".into())));
        assert_eq!(series.filter.max_amount, Some(AmountBound::Number(5000.0)));
        assert_eq!(series.filter.account_category, AccountCategory::Vn);
        assert_eq!(series.series_type, "line-items-aggregated-yearly");
    }

    #[test]
    fn test_validate_rejects_bad_region_opacity() {
        let mut chart = Chart::new("c1", "Spending");
        chart.annotations.push(Annotation::Region {
            start_value: 0.0,
            end_value: 1.0,
            orientation: Orientation::Vertical,
            title: "Recession".into(),
            description: None,
            color: "#ffcccc".into(),
            opacity: 1.5,
        });
        assert!(chart.validate().is_err());

        let blank = Chart::new("  ", "Blank");
        assert!(blank.validate().is_err());
    }
}
