use std::time::Duration;

/// Tuning knobs for [`crate::Circuit`].
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Consecutive countable failures in `Closed` before tripping to `Open`.
    pub failure_threshold: u32,
    /// Consecutive successes in `HalfOpen` before closing again.
    pub success_threshold: u32,
    /// How long the circuit stays `Open` before allowing a probe call.
    pub cooldown: Duration,
    /// When `true`, [`crate::Circuit::try_acquire`] always permits the call
    /// and no failures/successes are counted.
    pub disabled: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            cooldown: Duration::from_secs(30),
            disabled: false,
        }
    }
}
