//! JSON logging with an `EnvFilter`.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, or `default_directive` when unset or invalid.
pub fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the JSON subscriber. Later calls (or a subscriber installed by
/// someone else) leave the existing one in place.
pub fn init_with_default(default_directive: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(default_directive, "tracing initialised");
    }
}
