//! Bridge configuration
//!
//! Defaults reproduce the established store behavior. Values can come from a JSON
//! file, from `MVQ_*` environment variables, or from the `with_*` setters.

use crate::error::{MvqError, MvqResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Physical column holding the serialized row key
pub const DEFAULT_KEY_COLUMN: &str = "rowkey";

/// Clause that lets the store evaluate non-key predicates
pub const DEFAULT_SCAN_CLAUSE: &str = "ALLOW FILTERING";

/// 64-bit float 컬럼 읽기 정밀도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatPrecision {
    /// FLOAT64/DOUBLE are read through the 32-bit accessor
    #[default]
    Narrow,
    /// FLOAT64/DOUBLE are read at full precision
    Wide,
}

impl FloatPrecision {
    pub fn parse_precision(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "narrow" => Some(FloatPrecision::Narrow),
            "wide" => Some(FloatPrecision::Wide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub key_column: String,
    pub scan_clause: String,
    /// Prepend the key column to explicit projections
    pub inject_key_column: bool,
    pub float_precision: FloatPrecision,
    /// Value emitted for window bounds when a key cannot be decoded
    pub window_placeholder: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            scan_clause: DEFAULT_SCAN_CLAUSE.to_string(),
            inject_key_column: true,
            float_precision: FloatPrecision::Narrow,
            window_placeholder: 0,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> MvqResult<Self> {
        let config: BridgeConfig =
            serde_json::from_str(json).map_err(|e| MvqError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 파일에서 로드
    pub fn from_file(path: &Path) -> MvqResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 환경 변수 적용
    pub fn with_env_overrides(self) -> MvqResult<Self> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    pub(crate) fn apply_overrides<F>(mut self, lookup: F) -> MvqResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MVQ_KEY_COLUMN") {
            self.key_column = value;
        }
        if let Some(value) = lookup("MVQ_SCAN_CLAUSE") {
            self.scan_clause = value;
        }
        if let Some(value) = lookup("MVQ_INJECT_KEY_COLUMN") {
            self.inject_key_column = match value.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(MvqError::Config(format!(
                        "MVQ_INJECT_KEY_COLUMN: expected true/false/1/0, got '{}'",
                        value
                    )))
                }
            };
        }
        if let Some(value) = lookup("MVQ_FLOAT_PRECISION") {
            self.float_precision = FloatPrecision::parse_precision(&value).ok_or_else(|| {
                MvqError::Config(format!("MVQ_FLOAT_PRECISION: unknown precision '{}'", value))
            })?;
        }
        if let Some(value) = lookup("MVQ_WINDOW_PLACEHOLDER") {
            self.window_placeholder = value.trim().parse().map_err(|_| {
                MvqError::Config(format!("MVQ_WINDOW_PLACEHOLDER: not an integer '{}'", value))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }

    pub fn with_scan_clause(mut self, scan_clause: impl Into<String>) -> Self {
        self.scan_clause = scan_clause.into();
        self
    }

    pub fn with_inject_key_column(mut self, inject: bool) -> Self {
        self.inject_key_column = inject;
        self
    }

    pub fn with_float_precision(mut self, precision: FloatPrecision) -> Self {
        self.float_precision = precision;
        self
    }

    pub fn with_window_placeholder(mut self, placeholder: i64) -> Self {
        self.window_placeholder = placeholder;
        self
    }

    fn validate(&self) -> MvqResult<()> {
        if self.key_column.trim().is_empty() {
            return Err(MvqError::Config("key_column must not be empty".to_string()));
        }
        if self.key_column.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
            return Err(MvqError::Config(format!(
                "key_column '{}' is not a plain identifier",
                self.key_column
            )));
        }
        if self.scan_clause.contains(';') {
            return Err(MvqError::Config(
                "scan_clause must not contain a statement separator".to_string(),
            ));
        }
        Ok(())
    }
}
