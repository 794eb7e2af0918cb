//! 윈도우 테이블 조회 예제
//!
//! 실행: RUST_LOG=debug cargo run --example windowed_query --features logging

use arrow::array::{BinaryArray, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::util::pretty::pretty_format_batches;
use mvq_core::catalog::{LogicalField, LogicalSchema, MemoryCatalog, SourceTable, WindowedKeyFormat};
use mvq_core::decode::{Window, WindowedKeySerde};
use mvq_core::store::MemoryStore;
use mvq_core::{BridgeConfig, LogicalType, LogicalValue, MaterializedQueryExecutor};
use std::sync::Arc;

fn main() -> mvq_core::MvqResult<()> {
    #[cfg(feature = "logging")]
    mvq_core::logging::init();

    let format = WindowedKeyFormat::tumbling(60_000);
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.register(
        SourceTable::new(
            "CLICKS_PER_MIN",
            "clicks_per_min",
            LogicalSchema::new(
                Some(LogicalField::new("ROWKEY", LogicalType::String)),
                vec![LogicalField::new("CLICKS", LogicalType::BigInt)],
            ),
        )
        .windowed(format),
    );

    // 스토어가 돌려주는 물리 행: 직렬화된 윈도우 키(BLOB) + 값
    let minute = 1_700_000_040_000;
    let mut keys = Vec::new();
    for (user, start) in [("alice", minute), ("bob", minute), ("alice", minute + 60_000)] {
        keys.push(WindowedKeySerde::serialize(
            &format,
            &LogicalValue::String(user.to_string()),
            Window::new(start, 0),
        )?);
    }
    keys.push(b"corrupt".to_vec());

    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("rowkey", DataType::Binary, false),
            Field::new("clicks", DataType::Int64, false),
        ])),
        vec![
            Arc::new(BinaryArray::from_iter_values(keys.iter())),
            Arc::new(Int64Array::from(vec![3, 5, 1, 9])),
        ],
    )?;
    println!("=== 물리 행 ===");
    println!("{}", pretty_format_batches(&[batch.clone()])?);

    let store = Arc::new(MemoryStore::new());
    store.insert_batch("clicks_per_min", batch);

    let config = BridgeConfig::default().with_env_overrides()?;
    let executor = MaterializedQueryExecutor::with_config(catalog, Arc::clone(&store), &config);

    let statement = "SELECT ROWKEY, CLICKS FROM clicks_per_min;";
    let rows = executor.execute_sql(statement)?;

    println!("\n=== 논리 행 ===");
    println!("store query: {}", store.executed_queries().join("\n"));
    for row in &rows {
        println!("{}", serde_json::to_string(row)?);
    }

    Ok(())
}
