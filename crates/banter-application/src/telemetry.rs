//! Tracing subscriber initialization.
//!
//! Embedders call this once at startup; library code only emits `tracing`
//! events and never installs a subscriber on its own.

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info`. Calling it twice is harmless;
/// the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
