//! Process-wide logging setup shared by the binaries.

/// Install the JSON subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}

/// Like [`init`], with a different fallback when `RUST_LOG` is unset.
pub fn init_with_default(directive: &str) {
    tracing::init(directive);
}

pub const DEFAULT_FILTER: &str = "info";

pub mod tracing;
