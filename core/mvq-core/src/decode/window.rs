//! Key Decoder — windowed keys back into (key, window start, window end)
//!
//! Byte layouts understood by [`WindowedKeySerde`]:
//!
//! ```text
//! TUMBLING / HOPPING   inner_key ‖ start_ms (i64 BE)
//! SESSION              inner_key ‖ end_ms (i64 BE) ‖ start_ms (i64 BE)
//! ```
//!
//! Time windows do not carry their end; it is `start + size_ms`.

use crate::catalog::{KeyEncoding, SourceTable, WindowType, WindowedKeyFormat};
use crate::error::{MvqError, MvqResult};
use crate::store::PhysicalRow;
use crate::types::LogicalValue;
use std::sync::Arc;

/// Half-open window interval in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Window {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowedKey {
    pub key: LogicalValue,
    pub window: Window,
}

/// Serialization subsystem seam for windowed keys
pub trait KeyDeserializer: Send + Sync {
    fn deserialize(&self, format: &WindowedKeyFormat, bytes: &[u8]) -> MvqResult<WindowedKey>;
}

/// Default windowed key serde
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowedKeySerde;

impl WindowedKeySerde {
    /// Inverse of [`KeyDeserializer::deserialize`]; used by producers and tests.
    pub fn serialize(
        format: &WindowedKeyFormat,
        key: &LogicalValue,
        window: Window,
    ) -> MvqResult<Vec<u8>> {
        let mut bytes = encode_inner_key(format.key_encoding, key)?;
        match format.window {
            WindowType::Tumbling { .. } | WindowType::Hopping { .. } => {
                bytes.extend_from_slice(&window.start_ms.to_be_bytes());
            }
            WindowType::Session => {
                bytes.extend_from_slice(&window.end_ms.to_be_bytes());
                bytes.extend_from_slice(&window.start_ms.to_be_bytes());
            }
        }
        Ok(bytes)
    }
}

impl KeyDeserializer for WindowedKeySerde {
    fn deserialize(&self, format: &WindowedKeyFormat, bytes: &[u8]) -> MvqResult<WindowedKey> {
        let suffix_len = format.window.suffix_len();
        if bytes.len() < suffix_len {
            return Err(MvqError::KeyDecode(format!(
                "{} windowed key needs at least {} bytes, got {}",
                format.window.as_str(),
                suffix_len,
                bytes.len()
            )));
        }

        let (inner, suffix) = bytes.split_at(bytes.len() - suffix_len);
        let window = match format.window {
            WindowType::Tumbling { size_ms } | WindowType::Hopping { size_ms, .. } => {
                let start_ms = read_i64(suffix)?;
                let end_ms = start_ms.checked_add(size_ms).ok_or_else(|| {
                    MvqError::KeyDecode(format!("window end overflows: {} + {}", start_ms, size_ms))
                })?;
                Window::new(start_ms, end_ms)
            }
            WindowType::Session => {
                let end_ms = read_i64(&suffix[..8])?;
                let start_ms = read_i64(&suffix[8..])?;
                if start_ms > end_ms {
                    return Err(MvqError::KeyDecode(format!(
                        "session window starts after it ends: {} > {}",
                        start_ms, end_ms
                    )));
                }
                Window::new(start_ms, end_ms)
            }
        };

        Ok(WindowedKey {
            key: decode_inner_key(format.key_encoding, inner)?,
            window,
        })
    }
}

fn read_i64(bytes: &[u8]) -> MvqResult<i64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| MvqError::KeyDecode(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(i64::from_be_bytes(raw))
}

fn decode_inner_key(encoding: KeyEncoding, bytes: &[u8]) -> MvqResult<LogicalValue> {
    match encoding {
        KeyEncoding::String => std::str::from_utf8(bytes)
            .map(|s| LogicalValue::String(s.to_string()))
            .map_err(|e| MvqError::KeyDecode(format!("inner key is not UTF-8: {}", e))),
        KeyEncoding::Int => {
            let raw: [u8; 4] = bytes.try_into().map_err(|_| {
                MvqError::KeyDecode(format!("INT key needs 4 bytes, got {}", bytes.len()))
            })?;
            Ok(LogicalValue::Int(i32::from_be_bytes(raw)))
        }
        KeyEncoding::BigInt => read_i64(bytes).map(LogicalValue::BigInt),
        KeyEncoding::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)
                .map_err(|e| MvqError::KeyDecode(format!("inner key is not JSON: {}", e)))?;
            Ok(json_to_logical(value))
        }
    }
}

fn encode_inner_key(encoding: KeyEncoding, key: &LogicalValue) -> MvqResult<Vec<u8>> {
    match (encoding, key) {
        (KeyEncoding::String, LogicalValue::String(s)) => Ok(s.as_bytes().to_vec()),
        (KeyEncoding::Int, LogicalValue::Int(v)) => Ok(v.to_be_bytes().to_vec()),
        (KeyEncoding::BigInt, LogicalValue::BigInt(v)) => Ok(v.to_be_bytes().to_vec()),
        (KeyEncoding::Json, value) => Ok(serde_json::to_vec(value)?),
        (encoding, value) => Err(MvqError::KeyDecode(format!(
            "cannot encode {} key as {:?}",
            value.type_name(),
            encoding
        ))),
    }
}

fn json_to_logical(value: serde_json::Value) -> LogicalValue {
    use serde_json::Value;

    match value {
        Value::Null => LogicalValue::Null,
        Value::Bool(b) => LogicalValue::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(v) => LogicalValue::BigInt(v),
            None => LogicalValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => LogicalValue::String(s),
        Value::Array(items) => LogicalValue::List(items.into_iter().map(json_to_logical).collect()),
        Value::Object(fields) => LogicalValue::Map(
            fields
                .into_iter()
                .map(|(k, v)| (LogicalValue::String(k), json_to_logical(v)))
                .collect(),
        ),
    }
}

/// Reads a source's windowed key out of the physical key column.
#[derive(Clone)]
pub struct KeyDecoder {
    deserializer: Arc<dyn KeyDeserializer>,
    key_column: String,
}

impl KeyDecoder {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self::with_deserializer(key_column, Arc::new(WindowedKeySerde))
    }

    pub fn with_deserializer(
        key_column: impl Into<String>,
        deserializer: Arc<dyn KeyDeserializer>,
    ) -> Self {
        Self {
            deserializer,
            key_column: key_column.into(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Fallible decode. Callers decide how to degrade on error.
    pub fn decode_windowed_key<R: PhysicalRow + ?Sized>(
        &self,
        row: &R,
        source: &SourceTable,
    ) -> MvqResult<WindowedKey> {
        let format = source.key_format.as_ref().ok_or_else(|| {
            MvqError::KeyDecode(format!("source '{}' is not windowed", source.name))
        })?;
        let raw = match row.get_generic(&self.key_column)? {
            LogicalValue::Bytes(bytes) => bytes,
            LogicalValue::String(text) => text.into_bytes(),
            LogicalValue::Null => {
                return Err(MvqError::KeyDecode(format!(
                    "key column '{}' is null",
                    self.key_column
                )));
            }
            other => {
                return Err(MvqError::KeyDecode(format!(
                    "key column '{}' holds {}, expected BYTES or STRING",
                    self.key_column,
                    other.type_name()
                )));
            }
        };
        self.deserializer.deserialize(format, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LogicalField, LogicalSchema};
    use crate::store::rows_from_batch;
    use crate::types::LogicalType;
    use arrow::array::{BinaryArray, Int64Array, RecordBatch, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use proptest::prelude::*;

    fn windowed_source(format: WindowedKeyFormat) -> SourceTable {
        SourceTable::new(
            "PAGEVIEWS",
            "pageviews",
            LogicalSchema::new(
                Some(LogicalField::new("ROWKEY", LogicalType::String)),
                vec![LogicalField::new("COUNT", LogicalType::BigInt)],
            ),
        )
        .windowed(format)
    }

    fn key_row(key: Option<&str>) -> crate::store::BatchRow {
        let schema = Schema::new(vec![Field::new("rowkey", DataType::Utf8, true)]);
        let batch =
            RecordBatch::try_new(Arc::new(schema), vec![Arc::new(StringArray::from(vec![key]))])
                .unwrap();
        rows_from_batch(batch).remove(0)
    }

    #[test]
    fn test_tumbling_key() {
        let format = WindowedKeyFormat::tumbling(1_000);
        let key = LogicalValue::String("user1".into());
        let bytes = WindowedKeySerde::serialize(&format, &key, Window::new(4096, 0)).unwrap();
        let decoded = WindowedKeySerde.deserialize(&format, &bytes).unwrap();
        assert_eq!(decoded.key, LogicalValue::String("user1".to_string()));
        assert_eq!(decoded.window, Window::new(4096, 5096));
    }

    #[test]
    fn test_session_key_carries_both_bounds() {
        let format = WindowedKeyFormat::session().with_key_encoding(KeyEncoding::BigInt);
        let mut bytes = 42i64.to_be_bytes().to_vec();
        bytes.extend_from_slice(&300i64.to_be_bytes());
        bytes.extend_from_slice(&100i64.to_be_bytes());

        let decoded = WindowedKeySerde.deserialize(&format, &bytes).unwrap();
        assert_eq!(decoded.key, LogicalValue::BigInt(42));
        assert_eq!(decoded.window, Window::new(100, 300));
    }

    #[test]
    fn test_session_rejects_inverted_window() {
        let format = WindowedKeyFormat::session();
        let mut bytes = b"k".to_vec();
        bytes.extend_from_slice(&100i64.to_be_bytes());
        bytes.extend_from_slice(&300i64.to_be_bytes());
        assert!(WindowedKeySerde.deserialize(&format, &bytes).is_err());
    }

    #[test]
    fn test_json_inner_key() {
        let format =
            WindowedKeyFormat::hopping(60_000, 10_000).with_key_encoding(KeyEncoding::Json);
        let mut bytes = br#"{"region":"eu"}"#.to_vec();
        bytes.extend_from_slice(&0i64.to_be_bytes());

        let decoded = WindowedKeySerde.deserialize(&format, &bytes).unwrap();
        assert_eq!(
            decoded.key,
            LogicalValue::Map(vec![(
                LogicalValue::String("region".to_string()),
                LogicalValue::String("eu".to_string())
            )])
        );
        assert_eq!(decoded.window, Window::new(0, 60_000));
    }

    #[test]
    fn test_short_key_is_error() {
        let format = WindowedKeyFormat::tumbling(10);
        let err = WindowedKeySerde.deserialize(&format, b"abc").unwrap_err();
        assert!(matches!(err, MvqError::KeyDecode(_)));
    }

    #[test]
    fn test_int_key_length_checked() {
        let format = WindowedKeyFormat::tumbling(10).with_key_encoding(KeyEncoding::Int);
        let mut bytes = vec![0, 0, 1];
        bytes.extend_from_slice(&0i64.to_be_bytes());
        assert!(WindowedKeySerde.deserialize(&format, &bytes).is_err());
    }

    #[test]
    fn test_decoder_reads_key_column() {
        let format = WindowedKeyFormat::tumbling(100);
        let bytes = WindowedKeySerde::serialize(
            &format,
            &LogicalValue::String("k".into()),
            Window::new(0x10, 0),
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let decoder = KeyDecoder::new("ROWKEY");
        let decoded = decoder
            .decode_windowed_key(&key_row(Some(text.as_str())), &windowed_source(format))
            .unwrap();
        assert_eq!(decoded.window, Window::new(0x10, 0x10 + 100));
    }

    #[test]
    fn test_decoder_reads_binary_key_column() {
        let format = WindowedKeyFormat::tumbling(60_000);
        let start = 1_700_000_000_000;
        let bytes = WindowedKeySerde::serialize(
            &format,
            &LogicalValue::String("user1".into()),
            Window::new(start, 0),
        )
        .unwrap();
        assert!(String::from_utf8(bytes.clone()).is_err());

        let schema = Schema::new(vec![Field::new("rowkey", DataType::Binary, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(BinaryArray::from(vec![Some(bytes.as_slice())]))],
        )
        .unwrap();
        let row = &rows_from_batch(batch)[0];

        let decoded = KeyDecoder::new("rowkey")
            .decode_windowed_key(row, &windowed_source(format))
            .unwrap();
        assert_eq!(decoded.key, LogicalValue::String("user1".to_string()));
        assert_eq!(decoded.window, Window::new(start, start + 60_000));
    }

    #[test]
    fn test_decoder_rejects_numeric_key_column() {
        let schema = Schema::new(vec![Field::new("rowkey", DataType::Int64, true)]);
        let batch =
            RecordBatch::try_new(Arc::new(schema), vec![Arc::new(Int64Array::from(vec![7]))])
                .unwrap();
        let row = &rows_from_batch(batch)[0];

        let err = KeyDecoder::new("rowkey")
            .decode_windowed_key(row, &windowed_source(WindowedKeyFormat::tumbling(10)))
            .unwrap_err();
        assert!(matches!(err, MvqError::KeyDecode(ref msg) if msg.contains("BIGINT")));
    }

    #[test]
    fn test_decoder_null_key_and_plain_source() {
        let decoder = KeyDecoder::new("rowkey");
        let source = windowed_source(WindowedKeyFormat::tumbling(100));
        assert!(decoder.decode_windowed_key(&key_row(None), &source).is_err());

        let plain = SourceTable::new("T", "t", LogicalSchema::default());
        let err = decoder.decode_windowed_key(&key_row(Some("x")), &plain).unwrap_err();
        assert!(err.to_string().contains("not windowed"));
    }

    #[test]
    fn test_custom_deserializer() {
        struct Fixed;
        impl KeyDeserializer for Fixed {
            fn deserialize(&self, _: &WindowedKeyFormat, _: &[u8]) -> MvqResult<WindowedKey> {
                Ok(WindowedKey {
                    key: LogicalValue::Null,
                    window: Window::new(1, 2),
                })
            }
        }

        let decoder = KeyDecoder::with_deserializer("rowkey", Arc::new(Fixed));
        let source = windowed_source(WindowedKeyFormat::session());
        let decoded = decoder.decode_windowed_key(&key_row(Some("?")), &source).unwrap();
        assert_eq!(decoded.window, Window::new(1, 2));
    }

    proptest! {
        #[test]
        fn prop_deserialize_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            for format in [
                WindowedKeyFormat::tumbling(1_000),
                WindowedKeyFormat::session().with_key_encoding(KeyEncoding::Json),
                WindowedKeyFormat::hopping(10, 5).with_key_encoding(KeyEncoding::Int),
            ] {
                let result = WindowedKeySerde.deserialize(&format, &bytes);
                if let (WindowType::Session, Ok(decoded)) = (format.window, &result) {
                    prop_assert!(decoded.window.start_ms <= decoded.window.end_ms);
                }
            }
        }

        #[test]
        fn prop_tumbling_window_spans_size(
            start in -1_000_000i64..1_000_000,
            size in 1i64..86_400_000,
        ) {
            let format = WindowedKeyFormat::tumbling(size);
            let bytes = WindowedKeySerde::serialize(
                &format,
                &LogicalValue::String("k".into()),
                Window::new(start, 0),
            ).unwrap();
            let decoded = WindowedKeySerde.deserialize(&format, &bytes).unwrap();
            prop_assert_eq!(decoded.window.end_ms - decoded.window.start_ms, size);
        }
    }
}
