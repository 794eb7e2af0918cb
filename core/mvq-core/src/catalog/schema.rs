//! Logical schema and source-table handles

use crate::catalog::key_format::WindowedKeyFormat;
use crate::types::LogicalType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, typed column of a logical schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalField {
    pub name: String,
    pub data_type: LogicalType,
}

impl LogicalField {
    pub fn new(name: impl Into<String>, data_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Declared column set of a source: an optional key plus ordered value fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicalSchema {
    #[serde(default)]
    pub key: Option<LogicalField>,
    pub value_fields: Vec<LogicalField>,
}

impl LogicalSchema {
    pub fn new(key: Option<LogicalField>, value_fields: Vec<LogicalField>) -> Self {
        Self { key, value_fields }
    }

    /// Case-insensitive lookup over the key field and the value fields.
    pub fn find_field(&self, name: &str) -> Option<&LogicalField> {
        self.key
            .iter()
            .chain(self.value_fields.iter())
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn is_key_field(&self, name: &str) -> bool {
        self.key
            .as_ref()
            .is_some_and(|key| key.name.eq_ignore_ascii_case(name))
    }
}

/// 소스 종류. 스트림은 materialized 상태가 없으므로 조회 불가
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Stream,
    Table,
    MaterializedView,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Stream => "STREAM",
            SourceKind::Table => "TABLE",
            SourceKind::MaterializedView => "MATERIALIZED_VIEW",
        }
    }

    /// Whether the source has state in the backing store
    pub fn is_materialized(&self) -> bool {
        matches!(self, SourceKind::Table | SourceKind::MaterializedView)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for a logical source and its physical backing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    pub name: String,
    pub kind: SourceKind,
    pub schema: LogicalSchema,
    /// Physical object in the store (table name under the source keyspace)
    pub physical_name: String,
    /// Present exactly when the source was produced by a windowed aggregation
    #[serde(default)]
    pub key_format: Option<WindowedKeyFormat>,
}

impl SourceTable {
    pub fn new(
        name: impl Into<String>,
        physical_name: impl Into<String>,
        schema: LogicalSchema,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Table,
            schema,
            physical_name: physical_name.into(),
            key_format: None,
        }
    }

    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn windowed(mut self, key_format: WindowedKeyFormat) -> Self {
        self.key_format = Some(key_format);
        self
    }

    pub fn is_windowed(&self) -> bool {
        self.key_format.is_some()
    }
}
