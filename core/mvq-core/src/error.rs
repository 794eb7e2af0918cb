//! Error types for the materialized-view query bridge.
//!
//! All public APIs return `MvqResult<T>`. Library code does not panic.

use thiserror::Error;

/// Unified error type for all bridge operations.
#[derive(Debug, Error)]
pub enum MvqError {
    /// The parsed query has no FROM source that can be resolved to a single table
    #[error("unresolved source: {0}")]
    UnresolvedSource(String),

    /// The FROM source is not registered in the catalog
    #[error("source '{0}' not found")]
    SourceNotFound(String),

    /// The source exists but cannot be served from a materialized store
    #[error("incompatible data type for '{name}'; got {actual}, expected {expected}")]
    IncompatibleSource {
        name: String,
        actual: String,
        expected: String,
    },

    /// A projected column does not exist in the source schema
    #[error("column '{column}' not found in source '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Query shape the bridge does not serve
    #[error("query feature not supported: {feature}\nHint: {hint}")]
    UnsupportedQuery { feature: String, hint: String },

    /// SQL parsing error
    #[error("SQL parse error: {message}\nSQL: {sql}")]
    SqlParse { message: String, sql: String },

    /// Store-side failure (connectivity, query rejected, ...)
    #[error("store error: {0}")]
    Store(String),

    /// Physical column type does not match the requested getter
    #[error("type mismatch on '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// Windowed key bytes could not be deserialized
    #[error("key decode error: {0}")]
    KeyDecode(String),

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Apache Arrow error (RecordBatch operations)
    #[error("arrow error: {source}")]
    Arrow {
        #[from]
        source: arrow::error::ArrowError,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for all bridge operations.
pub type MvqResult<T> = Result<T, MvqError>;

// From 구현들
impl From<serde_json::Error> for MvqError {
    fn from(err: serde_json::Error) -> Self {
        MvqError::Serialization(err.to_string())
    }
}

impl MvqError {
    /// Precondition violations are raised before any store call is made.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MvqError::UnresolvedSource(_)
                | MvqError::SourceNotFound(_)
                | MvqError::IncompatibleSource { .. }
                | MvqError::ColumnNotFound { .. }
                | MvqError::UnsupportedQuery { .. }
                | MvqError::SqlParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_source_not_found() {
        let err = MvqError::SourceNotFound("MATVIEW".to_string());
        assert_eq!(err.to_string(), "source 'MATVIEW' not found");
    }

    #[test]
    fn error_display_column_not_found() {
        let err = MvqError::ColumnNotFound {
            table: "MATVIEW".to_string(),
            column: "COL9".to_string(),
        };
        assert_eq!(err.to_string(), "column 'COL9' not found in source 'MATVIEW'");
    }

    #[test]
    fn error_display_incompatible_source() {
        let err = MvqError::IncompatibleSource {
            name: "ORDERS".to_string(),
            actual: "STREAM".to_string(),
            expected: "TABLE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "incompatible data type for 'ORDERS'; got STREAM, expected TABLE"
        );
    }

    #[test]
    fn error_display_type_mismatch() {
        let err = MvqError::TypeMismatch {
            column: "col0".to_string(),
            expected: "Int32".to_string(),
            actual: "Utf8".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch on 'col0': expected Int32, got Utf8"
        );
    }

    #[test]
    fn error_display_unsupported_query() {
        let err = MvqError::UnsupportedQuery {
            feature: "JOIN".to_string(),
            hint: "Query a single materialized view".to_string(),
        };
        assert!(err.to_string().contains("not supported"));
        assert!(err.to_string().contains("JOIN"));
        assert!(err.to_string().contains("single materialized view"));
    }

    #[test]
    fn precondition_classification() {
        assert!(MvqError::UnresolvedSource("no FROM".to_string()).is_precondition());
        assert!(MvqError::SourceNotFound("X".to_string()).is_precondition());
        assert!(!MvqError::Store("connection refused".to_string()).is_precondition());
        assert!(!MvqError::KeyDecode("short".to_string()).is_precondition());
    }

    #[test]
    fn serde_json_error_converts() {
        let err: MvqError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MvqError::Serialization(_)));
    }
}
