//! Shared types for the charts store
//!
//! This crate contains the entity model persisted by the chart builder, the
//! backup document exchanged through export/import, and the error taxonomy
//! used by the store, the storage backends and the wasm bridge.

pub mod chart_config;
pub mod data_types;
pub mod errors;
pub mod store_state;

pub use chart_config::{
    AccountCategory, AmountBound, AnalyticsFilter, Annotation, Chart, ChartConfig, ChartType,
    Orientation, SeriesConfig, SeriesConfiguration, ThresholdCondition, YAxisId,
};
pub use data_types::{ChartCategory, StoredChart};
pub use errors::{ChartsError, ChartsResult, EntityKind, ErrorContext, ErrorResponse};
pub use store_state::{
    ChartsBackupFile, ConflictStrategy, ImportConflict, ImportPreview, ImportResult, BACKUP_TYPE,
    BACKUP_VERSION,
};

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// matching `Date.prototype.toISOString`
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_format() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
