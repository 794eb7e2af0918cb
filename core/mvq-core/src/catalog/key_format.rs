//! Key-format descriptors for windowed sources
//!
//! A windowed aggregation stores its key as `inner key ‖ window bounds`. The
//! descriptor tells the key deserializer how to split and read those bytes.

use serde::{Deserialize, Serialize};

/// 윈도우 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum WindowType {
    /// Fixed, non-overlapping windows. The key carries only the start.
    Tumbling { size_ms: i64 },
    /// Fixed, overlapping windows. The key carries only the start.
    Hopping { size_ms: i64, advance_ms: i64 },
    /// Gap-based windows. The key carries both end and start.
    Session,
}

impl WindowType {
    /// Number of trailing bytes taken by the window bounds
    pub fn suffix_len(&self) -> usize {
        match self {
            WindowType::Tumbling { .. } | WindowType::Hopping { .. } => 8,
            WindowType::Session => 16,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::Tumbling { .. } => "TUMBLING",
            WindowType::Hopping { .. } => "HOPPING",
            WindowType::Session => "SESSION",
        }
    }
}

/// Encoding of the inner (grouping) key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyEncoding {
    /// UTF-8 text
    #[default]
    String,
    /// 4-byte big-endian integer
    Int,
    /// 8-byte big-endian integer
    BigInt,
    /// JSON document
    Json,
}

/// Descriptor handed to the key deserializer for a windowed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowedKeyFormat {
    pub window: WindowType,
    #[serde(default)]
    pub key_encoding: KeyEncoding,
}

impl WindowedKeyFormat {
    pub fn tumbling(size_ms: i64) -> Self {
        Self {
            window: WindowType::Tumbling { size_ms },
            key_encoding: KeyEncoding::String,
        }
    }

    pub fn hopping(size_ms: i64, advance_ms: i64) -> Self {
        Self {
            window: WindowType::Hopping {
                size_ms,
                advance_ms,
            },
            key_encoding: KeyEncoding::String,
        }
    }

    pub fn session() -> Self {
        Self {
            window: WindowType::Session,
            key_encoding: KeyEncoding::String,
        }
    }

    pub fn with_key_encoding(mut self, key_encoding: KeyEncoding) -> Self {
        self.key_encoding = key_encoding;
        self
    }
}
