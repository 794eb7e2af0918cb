//! Type Dispatcher — logical field type → physical getter
//!
//! The mapping is a static table over the closed [`LogicalType`] set. Types that
//! have no entry go through the generic getter.

use crate::config::FloatPrecision;
use crate::error::MvqResult;
use crate::store::PhysicalRow;
use crate::types::{LogicalType, LogicalValue};

/// Physical extraction call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    String,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Map,
    Generic,
}

/// FLOAT64/DOUBLE resolve to `Float32` here; [`FloatPrecision::Wide`] upgrades them.
const DISPATCH_TABLE: [(LogicalType, Extractor); 12] = [
    (LogicalType::String, Extractor::String),
    (LogicalType::Boolean, Extractor::Boolean),
    (LogicalType::Int8, Extractor::Int32),
    (LogicalType::Int16, Extractor::Int32),
    (LogicalType::Int32, Extractor::Int32),
    (LogicalType::Integer, Extractor::Int32),
    (LogicalType::Int64, Extractor::Int64),
    (LogicalType::BigInt, Extractor::Int64),
    (LogicalType::Float32, Extractor::Float32),
    (LogicalType::Float64, Extractor::Float32),
    (LogicalType::Double, Extractor::Float32),
    (LogicalType::Map, Extractor::Map),
];

/// Extractor for a logical type. Total: unmapped types get `Generic`.
pub fn extractor_for(data_type: LogicalType, precision: FloatPrecision) -> Extractor {
    let extractor = DISPATCH_TABLE
        .iter()
        .find(|(ty, _)| *ty == data_type)
        .map(|(_, extractor)| *extractor)
        .unwrap_or(Extractor::Generic);

    match (data_type, precision) {
        (LogicalType::Float64 | LogicalType::Double, FloatPrecision::Wide) => Extractor::Float64,
        _ => extractor,
    }
}

impl Extractor {
    pub fn apply<R: PhysicalRow + ?Sized>(&self, row: &R, column: &str) -> MvqResult<LogicalValue> {
        Ok(match self {
            Extractor::String => row.get_string(column)?.into(),
            Extractor::Boolean => row.get_bool(column)?.into(),
            Extractor::Int32 => row.get_i32(column)?.into(),
            Extractor::Int64 => row.get_i64(column)?.into(),
            Extractor::Float32 => row.get_f32(column)?.into(),
            Extractor::Float64 => row.get_f64(column)?.into(),
            Extractor::Map => row
                .get_map(column)?
                .map_or(LogicalValue::Null, LogicalValue::Map),
            Extractor::Generic => row.get_generic(column)?,
        })
    }
}

/// Read `column` from `row` as declared by `data_type`.
pub fn extract<R: PhysicalRow + ?Sized>(
    row: &R,
    column: &str,
    data_type: LogicalType,
    precision: FloatPrecision,
) -> MvqResult<LogicalValue> {
    extractor_for(data_type, precision).apply(row, column)
}
