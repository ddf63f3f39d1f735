//! Quiet-period debouncing with caller-supplied time.

use std::time::{Duration, Instant};

/// Holds the latest value until no newer one has arrived for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the quiet period.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant at which the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule("ha", start);
        debouncer.schedule("ham", start + Duration::from_millis(200));

        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some("ham"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
