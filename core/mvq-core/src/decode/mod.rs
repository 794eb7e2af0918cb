//! Decode module — store rows → logical rows
//!
//! - [`dispatch`] — logical type → physical getter
//! - [`window`] — windowed key deserialization
//! - [`row`] — projection plan + per-row decoding

pub mod dispatch;
pub mod row;
pub mod window;

pub use dispatch::{Extractor, extract, extractor_for};
pub use row::{DecodePlan, PlannedColumn, RowDecoder, WINDOW_COLUMNS};
pub use window::{KeyDecoder, KeyDeserializer, Window, WindowedKey, WindowedKeySerde};
