//! Arrow result sets as physical rows
//!
//! A [`BatchRow`] is a cursor `(batch, row_idx)` over a shared `RecordBatch`.
//! Getters downcast the column the same way the typed column readers do and
//! widen or narrow between compatible numeric widths.

use crate::error::{MvqError, MvqResult};
use crate::store::PhysicalRow;
use crate::types::LogicalValue;
use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::datatypes::{
    DataType, Date32Type, Decimal128Type, Float32Type, Float64Type, Int8Type, Int16Type,
    Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use std::sync::Arc;

/// RecordBatch의 한 행
#[derive(Debug, Clone)]
pub struct BatchRow {
    batch: Arc<RecordBatch>,
    row: usize,
}

impl BatchRow {
    pub fn new(batch: Arc<RecordBatch>, row: usize) -> Self {
        Self { batch, row }
    }

    pub fn row_index(&self) -> usize {
        self.row
    }

    fn column(&self, name: &str) -> MvqResult<&ArrayRef> {
        let schema = self.batch.schema_ref();
        let idx = schema
            .fields()
            .iter()
            .position(|field| field.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| MvqError::Store(format!("column '{}' not in result set", name)))?;
        Ok(self.batch.column(idx))
    }

    /// Column plus null check; `None` means the cell is null.
    fn cell(&self, name: &str) -> MvqResult<Option<&ArrayRef>> {
        let column = self.column(name)?;
        if column.is_null(self.row) {
            Ok(None)
        } else {
            Ok(Some(column))
        }
    }
}

fn mismatch(column: &str, expected: &str, actual: &DataType) -> MvqError {
    MvqError::TypeMismatch {
        column: column.to_string(),
        expected: expected.to_string(),
        actual: format!("{:?}", actual),
    }
}

impl PhysicalRow for BatchRow {
    fn get_string(&self, column: &str) -> MvqResult<Option<String>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        match array.data_type() {
            DataType::Utf8 => Ok(Some(array.as_string::<i32>().value(self.row).to_string())),
            DataType::LargeUtf8 => Ok(Some(array.as_string::<i64>().value(self.row).to_string())),
            other => Err(mismatch(column, "Utf8", other)),
        }
    }

    fn get_bool(&self, column: &str) -> MvqResult<Option<bool>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        match array.data_type() {
            DataType::Boolean => Ok(Some(array.as_boolean().value(self.row))),
            other => Err(mismatch(column, "Boolean", other)),
        }
    }

    fn get_i32(&self, column: &str) -> MvqResult<Option<i32>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        let row = self.row;
        match array.data_type() {
            DataType::Int8 => Ok(Some(array.as_primitive::<Int8Type>().value(row) as i32)),
            DataType::Int16 => Ok(Some(array.as_primitive::<Int16Type>().value(row) as i32)),
            DataType::Int32 => Ok(Some(array.as_primitive::<Int32Type>().value(row))),
            other => Err(mismatch(column, "Int32", other)),
        }
    }

    fn get_i64(&self, column: &str) -> MvqResult<Option<i64>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        let row = self.row;
        match array.data_type() {
            DataType::Int8 => Ok(Some(array.as_primitive::<Int8Type>().value(row) as i64)),
            DataType::Int16 => Ok(Some(array.as_primitive::<Int16Type>().value(row) as i64)),
            DataType::Int32 => Ok(Some(array.as_primitive::<Int32Type>().value(row) as i64)),
            DataType::Int64 => Ok(Some(array.as_primitive::<Int64Type>().value(row))),
            other => Err(mismatch(column, "Int64", other)),
        }
    }

    fn get_f32(&self, column: &str) -> MvqResult<Option<f32>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        match array.data_type() {
            DataType::Float32 => Ok(Some(array.as_primitive::<Float32Type>().value(self.row))),
            DataType::Float64 => {
                Ok(Some(array.as_primitive::<Float64Type>().value(self.row) as f32))
            }
            other => Err(mismatch(column, "Float32", other)),
        }
    }

    fn get_f64(&self, column: &str) -> MvqResult<Option<f64>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        match array.data_type() {
            DataType::Float32 => {
                Ok(Some(array.as_primitive::<Float32Type>().value(self.row) as f64))
            }
            DataType::Float64 => Ok(Some(array.as_primitive::<Float64Type>().value(self.row))),
            other => Err(mismatch(column, "Float64", other)),
        }
    }

    fn get_map(&self, column: &str) -> MvqResult<Option<Vec<(LogicalValue, LogicalValue)>>> {
        let Some(array) = self.cell(column)? else {
            return Ok(None);
        };
        match array.data_type() {
            DataType::Map(..) => Ok(Some(map_entries(array.as_ref(), self.row)?)),
            other => Err(mismatch(column, "Map", other)),
        }
    }

    fn get_generic(&self, column: &str) -> MvqResult<LogicalValue> {
        let array = self.column(column)?;
        array_value(array.as_ref(), self.row)
    }
}

fn map_entries(array: &dyn Array, row: usize) -> MvqResult<Vec<(LogicalValue, LogicalValue)>> {
    let entries = array.as_map().value(row);
    let keys = entries.column(0);
    let values = entries.column(1);
    (0..entries.len())
        .map(|i| Ok((array_value(keys.as_ref(), i)?, array_value(values.as_ref(), i)?)))
        .collect()
}

/// Convert one cell of any Arrow array into a [`LogicalValue`].
/// Timestamps are exposed as epoch milliseconds.
fn timestamp_millis(array: &dyn Array, row: usize, unit: &TimeUnit) -> MvqResult<i64> {
    let millis = match unit {
        TimeUnit::Second => {
            let seconds = array.as_primitive::<TimestampSecondType>().value(row);
            seconds.checked_mul(1_000).ok_or_else(|| {
                MvqError::Store(format!(
                    "timestamp {}s does not fit in epoch milliseconds",
                    seconds
                ))
            })?
        }
        TimeUnit::Millisecond => array.as_primitive::<TimestampMillisecondType>().value(row),
        TimeUnit::Microsecond => {
            array.as_primitive::<TimestampMicrosecondType>().value(row) / 1_000
        }
        TimeUnit::Nanosecond => {
            array.as_primitive::<TimestampNanosecondType>().value(row) / 1_000_000
        }
    };
    Ok(millis)
}

pub fn array_value(array: &dyn Array, row: usize) -> MvqResult<LogicalValue> {
    if array.is_null(row) {
        return Ok(LogicalValue::Null);
    }

    let value = match array.data_type() {
        DataType::Null => LogicalValue::Null,
        DataType::Boolean => LogicalValue::Boolean(array.as_boolean().value(row)),
        DataType::Int8 => LogicalValue::Int(array.as_primitive::<Int8Type>().value(row) as i32),
        DataType::Int16 => LogicalValue::Int(array.as_primitive::<Int16Type>().value(row) as i32),
        DataType::Int32 => LogicalValue::Int(array.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => LogicalValue::BigInt(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => LogicalValue::Int(array.as_primitive::<UInt8Type>().value(row) as i32),
        DataType::UInt16 => {
            LogicalValue::Int(array.as_primitive::<UInt16Type>().value(row) as i32)
        }
        DataType::UInt32 => {
            LogicalValue::BigInt(array.as_primitive::<UInt32Type>().value(row) as i64)
        }
        DataType::UInt64 => {
            let v = array.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(LogicalValue::Double(v as f64), LogicalValue::BigInt)
        }
        DataType::Float32 => LogicalValue::Float(array.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => LogicalValue::Double(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => LogicalValue::String(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => {
            LogicalValue::String(array.as_string::<i64>().value(row).to_string())
        }
        DataType::Binary => LogicalValue::Bytes(array.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => {
            LogicalValue::Bytes(array.as_binary::<i64>().value(row).to_vec())
        }
        DataType::Timestamp(unit, _) => LogicalValue::BigInt(timestamp_millis(array, row, unit)?),
        DataType::Date32 => LogicalValue::Int(array.as_primitive::<Date32Type>().value(row)),
        DataType::Decimal128(..) => {
            LogicalValue::String(array.as_primitive::<Decimal128Type>().value_as_string(row))
        }
        DataType::List(_) => {
            let items = array.as_list::<i32>().value(row);
            LogicalValue::List(
                (0..items.len())
                    .map(|i| array_value(items.as_ref(), i))
                    .collect::<MvqResult<_>>()?,
            )
        }
        DataType::Map(..) => LogicalValue::Map(map_entries(array, row)?),
        DataType::Struct(fields) => {
            let columns = array.as_struct().columns();
            LogicalValue::Map(
                fields
                    .iter()
                    .zip(columns)
                    .map(|(field, column)| {
                        Ok((
                            LogicalValue::String(field.name().clone()),
                            array_value(column.as_ref(), row)?,
                        ))
                    })
                    .collect::<MvqResult<_>>()?,
            )
        }
        _ => LogicalValue::String(arrow::util::display::array_value_to_string(array, row)?),
    };
    Ok(value)
}

/// Split a batch into row cursors.
pub fn rows_from_batch(batch: RecordBatch) -> Vec<BatchRow> {
    let batch = Arc::new(batch);
    (0..batch.num_rows())
        .map(|row| BatchRow::new(Arc::clone(&batch), row))
        .collect()
}

pub fn rows_from_batches(batches: impl IntoIterator<Item = RecordBatch>) -> Vec<BatchRow> {
    batches.into_iter().flat_map(rows_from_batch).collect()
}
