//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default filter: quiet dependencies, verbose ordena crates.
const DEFAULT_FILTER: &str = "info,ordena_checkout=debug,ordena_storage=debug";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). `RUST_LOG`
/// overrides the default filter.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize with an explicit fallback filter (tests, embedded hosts).
pub fn init_with_filter(fallback: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // JSON logs + timestamps; checkout failure records (kind, field, code)
    // land as structured fields.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
