//! Store module — access to the external column-store.
//!
//! The bridge depends only on [`StoreSession`] and [`PhysicalRow`]. Result sets
//! arriving as Arrow `RecordBatch`es are adapted by [`arrow_row`].

pub mod arrow_row;
pub mod memory;

pub use arrow_row::{BatchRow, rows_from_batch, rows_from_batches};
pub use memory::MemoryStore;

use crate::error::MvqResult;
use crate::types::LogicalValue;

/// One row of a store result set, addressed by physical column name.
///
/// # Contract
///
/// - Column lookup is case-insensitive.
/// - A null cell is `Ok(None)` (or `LogicalValue::Null` for `get_generic`).
/// - A missing column or a getter that does not fit the physical type is an error.
pub trait PhysicalRow {
    fn get_string(&self, column: &str) -> MvqResult<Option<String>>;

    fn get_bool(&self, column: &str) -> MvqResult<Option<bool>>;

    fn get_i32(&self, column: &str) -> MvqResult<Option<i32>>;

    fn get_i64(&self, column: &str) -> MvqResult<Option<i64>>;

    /// 32-bit accessor. 64-bit physical values are narrowed.
    fn get_f32(&self, column: &str) -> MvqResult<Option<f32>>;

    fn get_f64(&self, column: &str) -> MvqResult<Option<f64>>;

    /// Untyped key/value entries
    fn get_map(&self, column: &str) -> MvqResult<Option<Vec<(LogicalValue, LogicalValue)>>>;

    /// Any physical type, converted as faithfully as possible
    fn get_generic(&self, column: &str) -> MvqResult<LogicalValue>;
}

/// Session against the backing store.
///
/// Implementations must be safe for concurrent read queries. `execute` is one
/// synchronous round trip; retries, if any, are the implementation's business.
pub trait StoreSession: Send + Sync {
    type Row: PhysicalRow;

    /// Run a store-native query and return its rows in store order.
    fn execute(&self, query: &str) -> MvqResult<Vec<Self::Row>>;
}
