use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Tracks reconnect attempts and computes the exponential backoff delay for
/// a [`crate::RealtimeClient`]'s connection loop.
///
/// `base_delay` can be overridden at runtime by a server-supplied `retry`
/// hint (the push transport's `retry: <ms>` framing field); the override
/// replaces the configured base rather than being capped by it.
pub struct ReconnectPolicy {
    base_delay_millis: AtomicU64,
    max_delay: Duration,
    attempt: AtomicU32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay_millis: AtomicU64::new(base_delay.as_millis() as u64),
            max_delay,
            attempt: AtomicU32::new(0),
        }
    }

    /// Replaces the base delay used for subsequent attempts, per a
    /// server-supplied `retry` hint.
    pub fn set_base_delay(&self, delay: Duration) {
        self.base_delay_millis
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay for the next attempt, then increments the attempt counter.
    pub fn next_delay(&self) -> (Duration, u32) {
        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst);
        let base = self.base_delay_millis.load(Ordering::SeqCst);
        let scaled = base.saturating_mul(1u64 << attempt.min(32));
        let delay = Duration::from_millis(scaled).min(self.max_delay);
        (delay, attempt)
    }

    /// Resets the attempt counter to 0 after a successful connect.
    pub fn reset(&self) {
        self.attempt.store(0, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> u32 {
        self.attempt.load(Ordering::SeqCst)
    }
}
