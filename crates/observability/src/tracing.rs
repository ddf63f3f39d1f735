//! Subscriber construction.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// JSON lines with timestamps; a second install is ignored.
pub fn init(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init("debug");
        assert!(!init("debug"));
        ::tracing::info!(order_id = 812, "still logging");
    }
}
