//! Configuration parser for multiple formats

use crate::{ConfigError, Result, StoreConfig};
use std::str::FromStr;

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    Yaml,
    #[default]
    Json,
    Toml,
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    /// Accepts a format name or a file extension, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::Parse(format!(
                "Unsupported config format: {}",
                other
            ))),
        }
    }
}

/// Configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse configuration from a string
    pub fn parse_string(content: &str, format: ConfigFormat) -> Result<StoreConfig> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("YAML parse error: {}", e))),
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e))),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e))),
        }
    }
}
