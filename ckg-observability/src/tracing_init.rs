//! `init_tracing()`: env-filter driven, JSON in non-interactive mode, the
//! same shape `cortex-storage::migrations` logs against already
//! (`tracing::{debug, info, warn}`) — this just wires up the subscriber
//! those call sites assume is installed.

use ckg_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Installs a global subscriber from `config`. Idempotent in the sense that
/// a second call is a no-op (via `try_init`) rather than a panic — useful
/// when both a binary entry point and its test harness call this.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {e}");
    }
}
