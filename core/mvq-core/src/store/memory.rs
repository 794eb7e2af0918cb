//! In-memory store session
//!
//! Serves the full contents of a physical table for any query whose FROM target
//! names it. Predicates are not evaluated. Every executed query string is kept
//! so callers can inspect what would have been sent to a real store.

use crate::error::{MvqError, MvqResult};
use crate::query::text::{find_keyword, ident_len, leading_whitespace};
use crate::store::{BatchRow, StoreSession, rows_from_batch};
use arrow::array::RecordBatch;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory store backed by Arrow batches per physical table
#[derive(Default)]
pub struct MemoryStore {
    tables: DashMap<String, Vec<Arc<RecordBatch>>>,
    executed: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch to a physical table (name is case-insensitive).
    pub fn insert_batch(&self, physical_name: &str, batch: RecordBatch) {
        self.tables
            .entry(physical_name.to_ascii_lowercase())
            .or_default()
            .push(Arc::new(batch));
    }

    pub fn clear(&self, physical_name: &str) {
        self.tables.remove(&physical_name.to_ascii_lowercase());
    }

    /// Make every following `execute` fail with a store error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Queries received so far, oldest first
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    /// Physical table addressed by `FROM <keyspace>.<table>`
    fn target_table(query: &str) -> MvqResult<String> {
        let from_idx = find_keyword(query, "FROM")
            .ok_or_else(|| MvqError::Store(format!("no FROM target in '{}'", query)))?;
        let after_from = from_idx + "FROM".len();
        let start = after_from + leading_whitespace(&query[after_from..]);
        let target = &query[start..start + ident_len(&query[start..])];
        let table = target.rsplit('.').next().unwrap_or(target);
        if table.is_empty() {
            return Err(MvqError::Store(format!("no FROM target in '{}'", query)));
        }
        Ok(table.to_ascii_lowercase())
    }
}

impl StoreSession for MemoryStore {
    type Row = BatchRow;

    fn execute(&self, query: &str) -> MvqResult<Vec<BatchRow>> {
        self.executed.lock().push(query.to_string());

        if let Some(message) = self.failure.lock().clone() {
            return Err(MvqError::Store(message));
        }

        let table = Self::target_table(query)?;
        let rows = self
            .tables
            .get(&table)
            .map(|batches| {
                batches
                    .iter()
                    .flat_map(|batch| rows_from_batch(RecordBatch::clone(batch)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}
