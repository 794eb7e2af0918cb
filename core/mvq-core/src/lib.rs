//! # MVQ — Materialized-View Query Bridge
//!
//! 스트리밍 엔진이 외부 컬럼 스토어에 materialize한 테이블을 SELECT로 조회합니다.
//! 쿼리를 스토어 네이티브 형태로 재작성하고, 물리 행을 논리 스키마에 맞는
//! 타입 있는 행으로 디코딩합니다.
//!
//! ## 빠른 시작
//!
//! ```rust
//! use std::sync::Arc;
//! use mvq_core::catalog::{LogicalField, LogicalSchema, MemoryCatalog, SourceTable};
//! use mvq_core::store::MemoryStore;
//! use mvq_core::types::LogicalType;
//! use mvq_core::MaterializedQueryExecutor;
//!
//! # fn main() -> mvq_core::MvqResult<()> {
//! let catalog = Arc::new(MemoryCatalog::new());
//! catalog.register(SourceTable::new(
//!     "MATVIEW",
//!     "test2",
//!     LogicalSchema::new(None, vec![LogicalField::new("COL0", LogicalType::BigInt)]),
//! ));
//! let store = Arc::new(MemoryStore::new());
//!
//! let executor = MaterializedQueryExecutor::new(catalog, Arc::clone(&store));
//! let rows = executor.execute_sql("SELECT * FROM matview;")?;
//!
//! assert!(rows.is_empty());
//! assert_eq!(store.executed_queries(), vec!["SELECT * FROM MATVIEW.test2;"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## 실행 파이프라인
//!
//! ```text
//! SELECT 문자열 + ParsedQuery → Catalog → QueryRewriter → StoreSession
//!          → RowDecoder (Type Dispatcher + Key Decoder) → Vec<LogicalRow>
//! ```
//!
//! ## 모듈 구조
//!
//! - [`bridge`] — 실행기 ([`MaterializedQueryExecutor`])
//! - [`catalog`] — 소스 메타데이터와 논리 스키마
//! - [`query`] — 파싱된 쿼리 뷰, 재작성기
//! - [`store`] — 물리 행 / 세션 트레이트, Arrow 어댑터
//! - [`decode`] — 타입 디스패치, 윈도우 키, 행 디코딩
//! - [`config`] — [`BridgeConfig`]

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod query;
pub mod store;
pub mod types;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use bridge::MaterializedQueryExecutor;
pub use catalog::{Catalog, MemoryCatalog, SourceKind, SourceTable};
pub use config::{BridgeConfig, FloatPrecision};
pub use error::{MvqError, MvqResult};
pub use query::ParsedQuery;
pub use types::{LogicalRow, LogicalType, LogicalValue};
