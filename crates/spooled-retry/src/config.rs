use std::time::Duration;

/// Tuning knobs for [`crate::RetryPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay for attempt 0.
    pub base_delay: Duration,
    /// Upper bound applied to every computed delay, including `Retry-After` hints.
    pub max_delay: Duration,
    /// Multiplier applied per attempt: `base_delay * factor^attempt`.
    pub factor: f64,
    /// Multiplicative jitter fraction in `[0, 1]`; delay is scaled by `1 + U(0, jitter)`.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            jitter: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_retries, 3);
        assert!(cfg.factor >= 1.0);
        assert!((0.0..=1.0).contains(&cfg.jitter));
    }
}
