//! # Logging Setup
//!
//! Structured logging via `tracing`. The filter comes from `PAYROLL_LOG`,
//! then `RUST_LOG`, then defaults to `info`.

use crate::config::LOG_FILTER_VAR;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = std::env::var(LOG_FILTER_VAR)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .try_init();
}
