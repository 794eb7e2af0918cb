//! Query Bridge — materialized view SELECT 실행기
//!
//! ```text
//! statement + ParsedQuery → Catalog lookup → DecodePlan → QueryRewriter
//!          → StoreSession::execute → RowDecoder → Vec<LogicalRow>
//! ```

use crate::catalog::{Catalog, SourceTable};
use crate::config::BridgeConfig;
use crate::decode::{DecodePlan, KeyDecoder, KeyDeserializer, RowDecoder};
use crate::error::{MvqError, MvqResult};
use crate::query::{ParsedQuery, QueryRewriter, SqlParser};
use crate::store::StoreSession;
use crate::types::LogicalRow;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Kind a source must have to be served from the store
const EXPECTED_KIND: &str = "TABLE";

/// Executes SELECTs against materialized sources.
///
/// Holds the catalog and the store session read-only; concurrent calls on one
/// executor are safe when `S` is.
pub struct MaterializedQueryExecutor<S: StoreSession> {
    catalog: Arc<dyn Catalog>,
    session: Arc<S>,
    rewriter: QueryRewriter,
    decoder: RowDecoder,
    parser: SqlParser,
}

impl<S: StoreSession> MaterializedQueryExecutor<S> {
    pub fn new(catalog: Arc<dyn Catalog>, session: Arc<S>) -> Self {
        Self::with_config(catalog, session, &BridgeConfig::default())
    }

    pub fn with_config(catalog: Arc<dyn Catalog>, session: Arc<S>, config: &BridgeConfig) -> Self {
        Self {
            catalog,
            session,
            rewriter: QueryRewriter::new(config),
            decoder: RowDecoder::new(config),
            parser: SqlParser::new(),
        }
    }

    /// Swap the windowed key deserializer.
    pub fn with_key_deserializer(
        mut self,
        config: &BridgeConfig,
        deserializer: Arc<dyn KeyDeserializer>,
    ) -> Self {
        let key_decoder = KeyDecoder::with_deserializer(config.key_column.clone(), deserializer);
        self.decoder = RowDecoder::with_key_decoder(config, key_decoder);
        self
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// 카탈로그에서 소스 조회 + 종류 검증
    pub fn resolve_source(&self, name: &str) -> MvqResult<Arc<SourceTable>> {
        let source = self
            .catalog
            .get_source(name)
            .ok_or_else(|| MvqError::SourceNotFound(name.to_string()))?;
        if !source.kind.is_materialized() {
            return Err(MvqError::IncompatibleSource {
                name: source.name.clone(),
                actual: source.kind.to_string(),
                expected: EXPECTED_KIND.to_string(),
            });
        }
        Ok(source)
    }

    /// Store-native text for `statement` without executing it.
    pub fn store_query(&self, statement: &str, query: &ParsedQuery) -> MvqResult<String> {
        let source = self.resolve_source(&query.source()?.source)?;
        self.rewriter.rewrite(statement, query, &source)
    }

    /// Run `statement` against the store and decode every returned row.
    #[instrument(skip(self, query), fields(source = tracing::field::Empty))]
    pub fn execute_query(
        &self,
        statement: &str,
        query: &ParsedQuery,
    ) -> MvqResult<Vec<LogicalRow>> {
        let from = query.source()?;
        tracing::Span::current().record("source", from.source.as_str());

        let source = self.resolve_source(&from.source)?;
        let plan = DecodePlan::build(&query.projection, &source)?;
        let store_query = self.rewriter.rewrite(statement, query, &source)?;
        debug!(store_query = %store_query, "executing store query");

        let rows = self.session.execute(&store_query)?;
        debug!(rows = rows.len(), windowed = plan.is_windowed(), "decoding rows");

        rows.iter()
            .map(|row| self.decoder.decode_with_plan(row, &plan, &source))
            .collect()
    }

    /// Parse `statement` and execute it.
    pub fn execute_sql(&self, statement: &str) -> MvqResult<Vec<LogicalRow>> {
        let query = self.parser.parse_query(statement)?;
        self.execute_query(statement, &query)
    }
}
