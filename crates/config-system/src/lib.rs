//! Configuration for the charts store
//! Storage keys, backup format and category matching policy

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser};
pub use validation::ConfigValidator;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Complete charts store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub storage: StorageConfig,
    pub backup: BackupConfig,
    pub categories: CategoryConfig,
}

/// Which Web Storage area (or in-process map) holds the data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Session,
    Memory,
}

/// Storage keys, scoped to the browser origin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub charts_key: String,
    pub categories_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            charts_key: "saved-charts".to_string(),
            categories_key: "chart-categories".to_string(),
        }
    }
}

/// Backup document settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupConfig {
    /// Highest backup version accepted on import, also written on export
    pub version: u32,
    /// Download file name prefix
    pub file_prefix: String,
    /// Pretty-print exported JSON
    pub pretty: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            version: 1,
            file_prefix: "charts-backup".to_string(),
            pretty: true,
        }
    }
}

/// How category names are compared when detecting duplicates and when
/// merging imported categories into existing ones. Names are always
/// trimmed first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatch {
    /// "Health" and "health" are the same category
    #[default]
    CaseInsensitive,
    /// Only byte-identical trimmed names match
    CaseSensitive,
}

impl NameMatch {
    /// Comparison key for a category name under this policy
    pub fn key(&self, name: &str) -> String {
        match self {
            NameMatch::CaseInsensitive => name.trim().to_lowercase(),
            NameMatch::CaseSensitive => name.trim().to_string(),
        }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryConfig {
    pub name_match: NameMatch,
}

impl StoreConfig {
    /// Configuration with the given name matching policy and defaults elsewhere
    pub fn with_name_match(name_match: NameMatch) -> Self {
        Self {
            categories: CategoryConfig { name_match },
            ..Self::default()
        }
    }

    /// Parse and validate a configuration document
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = ConfigParser::parse_string(content, format)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_browser_keys() {
        let config = StoreConfig::default();
        assert_eq!(config.storage.charts_key, "saved-charts");
        assert_eq!(config.storage.categories_key, "chart-categories");
        assert_eq!(config.backup.version, 1);
        assert_eq!(config.categories.name_match, NameMatch::CaseInsensitive);
    }

    #[test]
    fn test_name_match_policies() {
        assert!(NameMatch::CaseInsensitive.matches("  Health ", "health"));
        assert!(!NameMatch::CaseSensitive.matches("Health", "health"));
        assert!(NameMatch::CaseSensitive.matches(" Health", "Health  "));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{ "categories": { "nameMatch": "case-sensitive" } }"#).unwrap();
        assert_eq!(config.categories.name_match, NameMatch::CaseSensitive);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_parse_validates() {
        let config = StoreConfig::parse("backup:\n  pretty: false\n", ConfigFormat::Yaml).unwrap();
        assert!(!config.backup.pretty);

        let err = StoreConfig::parse(
            r#"{ "storage": { "chartsKey": "same", "categoriesKey": "same" } }"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
