//! Logical types and values — the SQL-layer view of a materialized row

use crate::error::{MvqError, MvqResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ════════════════════════════════════════════
// Logical Types
// ════════════════════════════════════════════

/// 논리 스키마에 선언된 필드 타입 (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalType {
    String,
    Boolean,
    Int8,
    Int16,
    Int32,
    Integer,
    Int64,
    BigInt,
    Float32,
    Float64,
    Double,
    Map,
    Bytes,
    Timestamp,
    Decimal,
    Array,
    Struct,
}

impl LogicalType {
    /// Canonical SQL spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::String => "STRING",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Int8 => "INT8",
            LogicalType::Int16 => "INT16",
            LogicalType::Int32 => "INT32",
            LogicalType::Integer => "INTEGER",
            LogicalType::Int64 => "INT64",
            LogicalType::BigInt => "BIGINT",
            LogicalType::Float32 => "FLOAT32",
            LogicalType::Float64 => "FLOAT64",
            LogicalType::Double => "DOUBLE",
            LogicalType::Map => "MAP",
            LogicalType::Bytes => "BYTES",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Decimal => "DECIMAL",
            LogicalType::Array => "ARRAY",
            LogicalType::Struct => "STRUCT",
        }
    }

    /// Parse a type name (case-insensitive). `VARCHAR` is accepted as STRING.
    pub fn parse_type(s: &str) -> MvqResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRING" | "VARCHAR" => Ok(LogicalType::String),
            "BOOLEAN" => Ok(LogicalType::Boolean),
            "INT8" => Ok(LogicalType::Int8),
            "INT16" => Ok(LogicalType::Int16),
            "INT32" => Ok(LogicalType::Int32),
            "INTEGER" | "INT" => Ok(LogicalType::Integer),
            "INT64" => Ok(LogicalType::Int64),
            "BIGINT" => Ok(LogicalType::BigInt),
            "FLOAT32" => Ok(LogicalType::Float32),
            "FLOAT64" => Ok(LogicalType::Float64),
            "DOUBLE" => Ok(LogicalType::Double),
            "MAP" => Ok(LogicalType::Map),
            "BYTES" => Ok(LogicalType::Bytes),
            "TIMESTAMP" => Ok(LogicalType::Timestamp),
            "DECIMAL" => Ok(LogicalType::Decimal),
            "ARRAY" => Ok(LogicalType::Array),
            "STRUCT" => Ok(LogicalType::Struct),
            other => Err(MvqError::Serialization(format!(
                "Unsupported logical type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════
// Logical Values
// ════════════════════════════════════════════

/// A single typed value of a logical row
///
/// Serializes untagged for output only. The JSON form drops the logical type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogicalValue {
    Null,
    Boolean(bool),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Key/value entries in store iteration order
    Map(Vec<(LogicalValue, LogicalValue)>),
    List(Vec<LogicalValue>),
}

impl LogicalValue {
    pub fn is_null(&self) -> bool {
        matches!(self, LogicalValue::Null)
    }

    /// Short type label used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            LogicalValue::Null => "NULL",
            LogicalValue::Boolean(_) => "BOOLEAN",
            LogicalValue::Int(_) => "INTEGER",
            LogicalValue::BigInt(_) => "BIGINT",
            LogicalValue::Float(_) => "FLOAT",
            LogicalValue::Double(_) => "DOUBLE",
            LogicalValue::String(_) => "STRING",
            LogicalValue::Bytes(_) => "BYTES",
            LogicalValue::Map(_) => "MAP",
            LogicalValue::List(_) => "ARRAY",
        }
    }
}

impl From<Option<String>> for LogicalValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::String)
    }
}

impl From<Option<bool>> for LogicalValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::Boolean)
    }
}

impl From<Option<i32>> for LogicalValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::Int)
    }
}

impl From<Option<i64>> for LogicalValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::BigInt)
    }
}

impl From<Option<f32>> for LogicalValue {
    fn from(value: Option<f32>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::Float)
    }
}

impl From<Option<f64>> for LogicalValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(LogicalValue::Null, LogicalValue::Double)
    }
}

/// One decoded row, ordered like the query projection
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct LogicalRow {
    values: Vec<LogicalValue>,
}

impl LogicalRow {
    pub fn new(values: Vec<LogicalValue>) -> Self {
        Self { values }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: LogicalValue) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&LogicalValue> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[LogicalValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<LogicalValue> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_aliases() {
        assert_eq!(LogicalType::parse_type("varchar").unwrap(), LogicalType::String);
        assert_eq!(LogicalType::parse_type("INT").unwrap(), LogicalType::Integer);
        assert_eq!(LogicalType::parse_type(" bigint ").unwrap(), LogicalType::BigInt);
        assert!(LogicalType::parse_type("GEOMETRY").is_err());
    }

    #[test]
    fn test_type_serde_uses_sql_spelling() {
        let json = serde_json::to_string(&LogicalType::BigInt).unwrap();
        assert_eq!(json, "\"BIGINT\"");
        let parsed: LogicalType = serde_json::from_str("\"FLOAT64\"").unwrap();
        assert_eq!(parsed, LogicalType::Float64);
    }

    #[test]
    fn test_option_conversions() {
        assert_eq!(LogicalValue::from(Some(7i32)), LogicalValue::Int(7));
        assert_eq!(LogicalValue::from(None::<String>), LogicalValue::Null);
        assert!(LogicalValue::from(None::<f64>).is_null());
    }

    #[test]
    fn test_row_serializes_as_array() {
        let row = LogicalRow::new(vec![
            LogicalValue::String("a".to_string()),
            LogicalValue::BigInt(10),
            LogicalValue::Null,
        ]);
        assert_eq!(serde_json::to_string(&row).unwrap(), "[\"a\",10,null]");
    }

    #[test]
    fn test_numeric_widths_serialize_alike() {
        let narrow = serde_json::to_string(&LogicalValue::Int(1)).unwrap();
        let wide = serde_json::to_string(&LogicalValue::BigInt(1)).unwrap();
        assert_eq!(narrow, wide);
        assert_eq!(
            serde_json::to_string(&LogicalValue::Float(0.5)).unwrap(),
            serde_json::to_string(&LogicalValue::Double(0.5)).unwrap()
        );
    }
}
