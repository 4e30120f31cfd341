//! Error types shared by the charts store crates
//! Provides consistent error handling and reporting across the JS boundary

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of entity an operation referred to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Chart,
    Category,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Chart => write!(f, "Chart"),
            EntityKind::Category => write!(f, "Category"),
        }
    }
}

/// Base error type for all charts store operations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ChartsError {
    /// User input failed a shape or non-empty constraint
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Imported JSON does not conform to the backup format
    #[error("Invalid backup file: {message}")]
    InvalidBackup {
        message: String,
        location: Option<String>,
    },

    /// Persisted JSON failed to parse. Recovered by reading as empty,
    /// only ever logged.
    #[error("Corrupt data under storage key {key}: {message}")]
    StorageCorruption { key: String, message: String },

    #[error("Storage write failed: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ChartsError {
    pub fn validation(message: impl Into<String>) -> Self {
        ChartsError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        ChartsError::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn chart_not_found(id: &str) -> Self {
        ChartsError::NotFound {
            kind: EntityKind::Chart,
            id: id.to_string(),
        }
    }

    pub fn category_not_found(id: &str) -> Self {
        ChartsError::NotFound {
            kind: EntityKind::Category,
            id: id.to_string(),
        }
    }

    pub fn invalid_backup(message: impl Into<String>, location: Option<String>) -> Self {
        ChartsError::InvalidBackup {
            message: message.into(),
            location,
        }
    }

    /// Errors the UI reports inline and recovers from
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ChartsError::Validation { .. }
                | ChartsError::NotFound { .. }
                | ChartsError::InvalidBackup { .. }
        )
    }
}

/// Result type alias for charts store operations
pub type ChartsResult<T> = Result<T, ChartsError>;

/// Error response structure for JavaScript interop
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ChartsError,
    pub timestamp: u64,
    pub context: Option<ErrorContext>,
}

/// Additional context for error reporting
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
    pub metadata: serde_json::Value,
}

impl ErrorResponse {
    pub fn new(error: ChartsError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            context: None,
        }
    }

    pub fn with_context(mut self, component: &str, operation: &str) -> Self {
        self.context = Some(ErrorContext {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: serde_json::Value::Null,
        });
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        if let Some(ref mut ctx) = self.context {
            ctx.metadata = metadata;
        }
        self
    }

    /// Convert to JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"Internal","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for ChartsError {
    fn from(err: serde_json::Error) -> Self {
        ChartsError::Internal {
            message: format!("JSON error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = ChartsError::invalid_backup("charts must be an array", Some("charts".into()));

        let response = ErrorResponse::new(error)
            .with_context("ChartsBackupRestore", "preview_import")
            .with_metadata(serde_json::json!({ "source": "file" }));

        let json = response.to_json();
        assert!(json.contains("InvalidBackup"));
        assert!(json.contains("charts must be an array"));
        assert!(json.contains("preview_import"));
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            ChartsError::category_not_found("cat-9").to_string(),
            "Category not found: cat-9"
        );
        assert!(ChartsError::chart_not_found("a").is_user_facing());
        assert!(!ChartsError::Storage {
            message: "quota".into()
        }
        .is_user_facing());
    }
}
