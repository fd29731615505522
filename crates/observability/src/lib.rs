//! Process-wide logging setup shared by the binaries and test harnesses.

/// Initialize tracing with `RUST_LOG`, defaulting to `info`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with_default("info");
}

pub use tracing::init_with_default;

/// Subscriber and filter configuration.
pub mod tracing;
