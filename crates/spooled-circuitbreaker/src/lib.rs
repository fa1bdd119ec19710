//! Count-based circuit breaker for the Spooled SDK transport.
//!
//! Simpler than a sliding-window breaker: three states, each carrying only
//! the count relevant to its own transition (consecutive failures in
//! `Closed`, consecutive successes in `HalfOpen`). No slow-call tracking,
//! no time-based window, just `failureThreshold`, `successThreshold`, and
//! `cooldown`.

mod circuit;
mod config;
mod events;

pub use circuit::{Circuit, CircuitMetrics, CircuitState};
pub use config::CircuitBreakerConfig;
pub use events::CircuitBreakerEvent;
