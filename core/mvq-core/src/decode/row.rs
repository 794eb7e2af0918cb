//! Row Decoder — physical row → logical row
//!
//! Projection resolution is separated from decoding: [`DecodePlan::build`] runs
//! once per query and is the only place an unknown column can fail, so a bad
//! projection is rejected before the store is contacted.

use crate::catalog::SourceTable;
use crate::config::{BridgeConfig, FloatPrecision};
use crate::decode::dispatch::{Extractor, extractor_for};
use crate::decode::window::{KeyDecoder, WindowedKey};
use crate::error::{MvqError, MvqResult};
use crate::query::Projection;
use crate::store::PhysicalRow;
use crate::types::{LogicalRow, LogicalType, LogicalValue};
use tracing::warn;

/// Trailing window columns appended for windowed sources
pub const WINDOW_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
enum ColumnSource {
    /// Read through the type dispatcher
    Field {
        column: String,
        data_type: LogicalType,
    },
    /// Inner key of a windowed source
    WindowedKey,
}

/// One output column of the plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedColumn {
    pub output_name: String,
    source: ColumnSource,
}

/// Resolved projection for one query against one source
#[derive(Debug, Clone, PartialEq)]
pub struct DecodePlan {
    columns: Vec<PlannedColumn>,
    windowed: bool,
}

impl DecodePlan {
    pub fn build(projection: &Projection, source: &SourceTable) -> MvqResult<Self> {
        let schema = &source.schema;
        let windowed = source.is_windowed();

        let columns = match projection {
            Projection::All => schema
                .value_fields
                .iter()
                .map(|field| PlannedColumn {
                    output_name: field.name.clone(),
                    source: ColumnSource::Field {
                        column: field.name.clone(),
                        data_type: field.data_type,
                    },
                })
                .collect(),
            Projection::Columns(selected) => selected
                .iter()
                .map(|item| {
                    let output_name = item.output_name();
                    // The store returns the referenced column under its output name.
                    let field = schema
                        .find_field(&item.column)
                        .or_else(|| schema.find_field(output_name))
                        .ok_or_else(|| MvqError::ColumnNotFound {
                            table: source.name.clone(),
                            column: item.column.clone(),
                        })?;

                    let column_source = if windowed && schema.is_key_field(&field.name) {
                        ColumnSource::WindowedKey
                    } else {
                        ColumnSource::Field {
                            column: output_name.to_string(),
                            data_type: field.data_type,
                        }
                    };
                    Ok(PlannedColumn {
                        output_name: output_name.to_string(),
                        source: column_source,
                    })
                })
                .collect::<MvqResult<_>>()?,
        };

        Ok(Self { columns, windowed })
    }

    /// Values per decoded row, window columns included
    pub fn width(&self) -> usize {
        self.columns.len() + if self.windowed { WINDOW_COLUMNS } else { 0 }
    }

    pub fn columns(&self) -> &[PlannedColumn] {
        &self.columns
    }

    pub fn is_windowed(&self) -> bool {
        self.windowed
    }

    /// Output column names, `WINDOWSTART`/`WINDOWEND` included for windowed sources.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.iter().map(|c| c.output_name.clone()).collect();
        if self.windowed {
            names.push("WINDOWSTART".to_string());
            names.push("WINDOWEND".to_string());
        }
        names
    }
}

pub struct RowDecoder {
    key_decoder: KeyDecoder,
    precision: FloatPrecision,
    window_placeholder: i64,
}

impl RowDecoder {
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_key_decoder(config, KeyDecoder::new(config.key_column.clone()))
    }

    pub fn with_key_decoder(config: &BridgeConfig, key_decoder: KeyDecoder) -> Self {
        Self {
            key_decoder,
            precision: config.float_precision,
            window_placeholder: config.window_placeholder,
        }
    }

    /// Resolve `projection` and decode a single row.
    pub fn decode<R: PhysicalRow + ?Sized>(
        &self,
        row: &R,
        projection: &Projection,
        source: &SourceTable,
    ) -> MvqResult<LogicalRow> {
        let plan = DecodePlan::build(projection, source)?;
        self.decode_with_plan(row, &plan, source)
    }

    pub fn decode_with_plan<R: PhysicalRow + ?Sized>(
        &self,
        row: &R,
        plan: &DecodePlan,
        source: &SourceTable,
    ) -> MvqResult<LogicalRow> {
        let windowed_key = if plan.windowed {
            self.windowed_key_or_placeholder(row, source)
        } else {
            None
        };

        let mut values = LogicalRow::with_capacity(plan.width());
        for column in &plan.columns {
            let value = match &column.source {
                ColumnSource::Field { column, data_type } => {
                    Extractor::apply(&extractor_for(*data_type, self.precision), row, column)?
                }
                ColumnSource::WindowedKey => windowed_key
                    .as_ref()
                    .map_or(LogicalValue::Null, |k| k.key.clone()),
            };
            values.push(value);
        }

        if plan.windowed {
            let (start, end) = windowed_key.map_or(
                (self.window_placeholder, self.window_placeholder),
                |k| (k.window.start_ms, k.window.end_ms),
            );
            values.push(LogicalValue::BigInt(start));
            values.push(LogicalValue::BigInt(end));
        }

        Ok(values)
    }

    /// Key decode errors stop here: logged, then replaced by placeholders.
    fn windowed_key_or_placeholder<R: PhysicalRow + ?Sized>(
        &self,
        row: &R,
        source: &SourceTable,
    ) -> Option<WindowedKey> {
        match self.key_decoder.decode_windowed_key(row, source) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(
                    source = %source.name,
                    key_column = %self.key_decoder.key_column(),
                    error = %e,
                    "windowed key decode failed, using placeholder window"
                );
                None
            }
        }
    }
}

impl Default for RowDecoder {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LogicalField, LogicalSchema, WindowedKeyFormat};
    use crate::decode::window::{Window, WindowedKeySerde};
    use crate::query::SelectedColumn;
    use crate::store::{BatchRow, rows_from_batch};
    use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn schema() -> LogicalSchema {
        LogicalSchema::new(
            Some(LogicalField::new("ROWKEY", LogicalType::String)),
            vec![
                LogicalField::new("COL0", LogicalType::BigInt),
                LogicalField::new("COL1", LogicalType::String),
                LogicalField::new("COL2", LogicalType::Double),
            ],
        )
    }

    fn plain() -> SourceTable {
        SourceTable::new("MATVIEW", "test2", schema())
    }

    fn windowed() -> SourceTable {
        plain().windowed(WindowedKeyFormat::tumbling(1_000))
    }

    fn key_text(key: &str, start_ms: i64) -> String {
        let bytes = WindowedKeySerde::serialize(
            &WindowedKeyFormat::tumbling(1_000),
            &LogicalValue::String(key.to_string()),
            Window::new(start_ms, 0),
        )
        .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    fn rows(rowkeys: Vec<String>) -> Vec<BatchRow> {
        let n = rowkeys.len();
        let schema = Schema::new(vec![
            Field::new("rowkey", DataType::Utf8, true),
            Field::new("col0", DataType::Int64, true),
            Field::new("col1", DataType::Utf8, true),
            Field::new("col2", DataType::Float64, true),
            Field::new("total", DataType::Int64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(rowkeys)),
                Arc::new(Int64Array::from((0..n as i64).collect::<Vec<_>>())),
                Arc::new(StringArray::from(vec!["v"; n])),
                Arc::new(Float64Array::from(vec![0.5; n])),
                Arc::new(Int64Array::from(vec![99; n])),
            ],
        )
        .unwrap();
        rows_from_batch(batch)
    }

    #[test]
    fn test_wildcard_uses_value_fields_in_order() {
        let rows = rows(vec!["k".to_string()]);
        let row = RowDecoder::default()
            .decode(&rows[0], &Projection::All, &plain())
            .unwrap();
        assert_eq!(
            row.values(),
            &[
                LogicalValue::BigInt(0),
                LogicalValue::String("v".to_string()),
                LogicalValue::Float(0.5),
            ]
        );
    }

    #[test]
    fn test_explicit_projection_order_and_alias() {
        let rows = rows(vec!["k".to_string()]);
        let projection = Projection::Columns(vec![
            SelectedColumn::new("col1"),
            SelectedColumn::aliased("COL0", "TOTAL"),
        ]);
        let row = RowDecoder::default()
            .decode(&rows[0], &projection, &plain())
            .unwrap();
        assert_eq!(
            row.values(),
            &[LogicalValue::String("v".to_string()), LogicalValue::BigInt(99)]
        );
    }

    #[test]
    fn test_alias_naming_another_column_keeps_referenced_type() {
        let schema = Schema::new(vec![Field::new("col1", DataType::Int64, true)]);
        let batch =
            RecordBatch::try_new(Arc::new(schema), vec![Arc::new(Int64Array::from(vec![500]))])
                .unwrap();
        let rows = rows_from_batch(batch);
        let projection = Projection::Columns(vec![SelectedColumn::aliased("COL0", "COL1")]);

        let row = RowDecoder::default()
            .decode(&rows[0], &projection, &plain())
            .unwrap();
        assert_eq!(row.values(), &[LogicalValue::BigInt(500)]);
        assert_eq!(
            DecodePlan::build(&projection, &plain()).unwrap().column_names(),
            vec!["COL1"]
        );
    }

    #[test]
    fn test_unknown_column_fails_plan() {
        let projection = Projection::Columns(vec![SelectedColumn::new("COL9")]);
        let err = DecodePlan::build(&projection, &plain()).unwrap_err();
        assert!(matches!(err, MvqError::ColumnNotFound { ref column, .. } if column == "COL9"));
    }

    #[test]
    fn test_windowed_rows_get_two_trailing_values() {
        let rows = rows(vec![key_text("user1", 4096)]);
        let source = windowed();
        let decoder = RowDecoder::default();

        let all = decoder.decode(&rows[0], &Projection::All, &source).unwrap();
        assert_eq!(all.len(), 3 + WINDOW_COLUMNS);
        assert_eq!(all.get(3), Some(&LogicalValue::BigInt(4096)));
        assert_eq!(all.get(4), Some(&LogicalValue::BigInt(5096)));

        let one = Projection::Columns(vec![SelectedColumn::new("COL1")]);
        assert_eq!(decoder.decode(&rows[0], &one, &source).unwrap().len(), 1 + WINDOW_COLUMNS);
    }

    #[test]
    fn test_windowed_key_column_is_decoded() {
        let rows = rows(vec![key_text("user1", 0)]);
        let projection = Projection::Columns(vec![SelectedColumn::new("ROWKEY")]);
        let row = RowDecoder::default()
            .decode(&rows[0], &projection, &windowed())
            .unwrap();
        assert_eq!(
            row.values(),
            &[
                LogicalValue::String("user1".to_string()),
                LogicalValue::BigInt(0),
                LogicalValue::BigInt(1_000),
            ]
        );
    }

    #[test]
    fn test_malformed_key_yields_placeholders() {
        let rows = rows(vec!["bad".to_string(), key_text("ok", 64)]);
        let projection = Projection::Columns(vec![
            SelectedColumn::new("ROWKEY"),
            SelectedColumn::new("COL0"),
        ]);
        let decoder = RowDecoder::new(&BridgeConfig::default().with_window_placeholder(-1));
        let plan = DecodePlan::build(&projection, &windowed()).unwrap();

        let bad = decoder.decode_with_plan(&rows[0], &plan, &windowed()).unwrap();
        assert_eq!(
            bad.values(),
            &[
                LogicalValue::Null,
                LogicalValue::BigInt(0),
                LogicalValue::BigInt(-1),
                LogicalValue::BigInt(-1),
            ]
        );

        let good = decoder.decode_with_plan(&rows[1], &plan, &windowed()).unwrap();
        assert_eq!(good.get(2), Some(&LogicalValue::BigInt(64)));
    }

    #[test]
    fn test_plan_column_names() {
        let plan = DecodePlan::build(&Projection::All, &windowed()).unwrap();
        assert_eq!(
            plan.column_names(),
            vec!["COL0", "COL1", "COL2", "WINDOWSTART", "WINDOWEND"]
        );
        assert_eq!(plan.width(), 5);
        assert!(!DecodePlan::build(&Projection::All, &plain()).unwrap().is_windowed());
    }
}
