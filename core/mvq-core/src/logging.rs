//! Logging utilities for the query bridge
//!
//! The bridge only emits `tracing` events; installing a subscriber is up to the
//! embedding process. These helpers cover the common cases.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter: bridge events at info, everything else at warn
#[cfg(feature = "logging")]
const DEFAULT_FILTER: &str = "warn,mvq_core=info";

/// Initialize logging with default settings
///
/// # Environment Variables
/// - `RUST_LOG` - Log level filter (default: "warn,mvq_core=info")
///
/// # Example
/// ```rust
/// mvq_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level(DEFAULT_FILTER)
}

/// Initialize logging with a specific filter directive
///
/// # Arguments
/// * `level` - Level or directive (`debug`, `mvq_core::decode=trace`, ...)
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init in the same process is ignored.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Initialize logging for tests
///
/// Routes output through the test harness so `cargo test -- --nocapture` shows it.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("mvq_core=debug"))
        .with_test_writer()
        .try_init();
}

// Stub implementations when logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
