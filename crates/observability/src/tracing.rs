//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "PROTOTYPER_LOG";

/// Directive used when neither variable is set (or parses).
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Builds the filter from `PROTOTYPER_LOG`, then `RUST_LOG`, then `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    // JSON logs + timestamps.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .with_target(false)
        .try_init();
}
