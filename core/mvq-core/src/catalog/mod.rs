//! Catalog module — read-only view of registered sources.
//!
//! The bridge depends only on the [`Catalog`] trait. [`MemoryCatalog`] is the
//! in-process implementation used by embedders and tests.

pub mod key_format;
pub mod schema;

pub use key_format::{KeyEncoding, WindowType, WindowedKeyFormat};
pub use schema::{LogicalField, LogicalSchema, SourceKind, SourceTable};

use crate::error::MvqResult;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Metadata lookup consumed by the bridge.
///
/// # Contract
///
/// - `get_source`: Returns `None` for unknown names, never errors.
/// - Lookups are case-insensitive.
/// - Returned handles are immutable for the lifetime of the registration.
pub trait Catalog: Send + Sync {
    /// Look up a source by logical name.
    fn get_source(&self, name: &str) -> Option<Arc<SourceTable>>;

    /// All registered sources, sorted by name.
    fn list_sources(&self) -> Vec<Arc<SourceTable>>;

    /// Sources that can be served from the store.
    fn list_materialized(&self) -> Vec<Arc<SourceTable>> {
        self.list_sources()
            .into_iter()
            .filter(|source| source.kind.is_materialized())
            .collect()
    }
}

/// In-memory catalog keyed by upper-cased source name
#[derive(Default)]
pub struct MemoryCatalog {
    sources: DashMap<String, Arc<SourceTable>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a source. Returns the previous registration.
    pub fn register(&self, source: SourceTable) -> Option<Arc<SourceTable>> {
        self.sources
            .insert(source.name.to_ascii_uppercase(), Arc::new(source))
    }

    pub fn deregister(&self, name: &str) -> Option<Arc<SourceTable>> {
        self.sources
            .remove(&name.to_ascii_uppercase())
            .map(|(_, source)| source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load source definitions from a JSON array of [`SourceTable`].
    pub fn from_json_str(json: &str) -> MvqResult<Self> {
        let sources: Vec<SourceTable> = serde_json::from_str(json)?;
        let catalog = Self::new();
        for source in sources {
            catalog.register(source);
        }
        info!("Loaded {} sources into catalog", catalog.len());
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> MvqResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Catalog for MemoryCatalog {
    fn get_source(&self, name: &str) -> Option<Arc<SourceTable>> {
        self.sources
            .get(&name.to_ascii_uppercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    fn list_sources(&self) -> Vec<Arc<SourceTable>> {
        let mut sources: Vec<Arc<SourceTable>> = self
            .sources
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        sources
    }
}
