use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use parking_lot::Mutex;
use spooled_core::events::EventListeners;
use std::time::{Duration, Instant};

/// The breaker's state machine. Unlike a sliding-window breaker, the count
/// each state carries is scoped to that state: `Closed` counts consecutive
/// failures, `HalfOpen` counts consecutive successes, and either resets to
/// zero on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Point-in-time view of the breaker for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub opened_at: Option<Instant>,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
}

/// A count-based circuit breaker.
///
/// `failureThreshold` consecutive countable failures trip the breaker;
/// after `cooldown` the next call is let through as a probe; `successThreshold`
/// consecutive probe successes close it again; any probe failure re-opens it.
pub struct Circuit {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
    events: EventListeners<CircuitBreakerEvent>,
}

impl Circuit {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
            }),
            events: EventListeners::new(),
        }
    }

    /// Registers an event listener. Intended to be called before the circuit
    /// is shared, since listener registration is not itself synchronized.
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: spooled_core::events::EventListener<CircuitBreakerEvent> + 'static,
    {
        self.events.add(listener);
        self
    }

    /// Whether the status code counts toward tripping the breaker: network
    /// and timeout failures, 5xx, and 429 count; other 4xx do not.
    pub fn is_countable_failure(status: Option<u16>, network_or_timeout: bool) -> bool {
        match status {
            None => network_or_timeout,
            Some(429) => true,
            Some(status) if (500..600).contains(&status) => true,
            Some(_) => false,
        }
    }

    /// Returns `true` if the call may proceed. A transition from `Open` to
    /// `HalfOpen` is performed here, lazily, on the first call after cooldown.
    pub fn try_acquire(&self) -> bool {
        if self.config.disabled {
            return true;
        }

        let mut guard = self.inner.lock();
        match guard.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let opened_at = guard.opened_at.expect("Open state always carries opened_at");
                if opened_at.elapsed() >= self.config.cooldown {
                    guard.state = CircuitState::HalfOpen;
                    guard.consecutive_successes = 0;
                    drop(guard);
                    self.emit_transition(CircuitState::Open, CircuitState::HalfOpen);
                    true
                } else {
                    drop(guard);
                    self.events.emit(&CircuitBreakerEvent::CallRejected {
                        timestamp: Instant::now(),
                    });
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        if self.config.disabled {
            return;
        }

        let mut guard = self.inner.lock();
        match guard.state {
            CircuitState::Closed => {
                guard.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                guard.consecutive_successes += 1;
                if guard.consecutive_successes >= self.config.success_threshold {
                    guard.state = CircuitState::Closed;
                    guard.consecutive_failures = 0;
                    guard.consecutive_successes = 0;
                    guard.opened_at = None;
                    drop(guard);
                    self.emit_transition(CircuitState::HalfOpen, CircuitState::Closed);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self, status: Option<u16>, network_or_timeout: bool) {
        if self.config.disabled {
            return;
        }
        if !Self::is_countable_failure(status, network_or_timeout) {
            return;
        }

        let mut guard = self.inner.lock();
        match guard.state {
            CircuitState::Closed => {
                guard.consecutive_failures += 1;
                if guard.consecutive_failures >= self.config.failure_threshold {
                    guard.state = CircuitState::Open;
                    guard.opened_at = Some(Instant::now());
                    drop(guard);
                    self.emit_transition(CircuitState::Closed, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                guard.state = CircuitState::Open;
                guard.opened_at = Some(Instant::now());
                guard.consecutive_successes = 0;
                drop(guard);
                self.emit_transition(CircuitState::HalfOpen, CircuitState::Open);
            }
            CircuitState::Open => {}
        }
    }

    pub fn reset(&self) {
        let mut guard = self.inner.lock();
        let from = guard.state;
        guard.state = CircuitState::Closed;
        guard.consecutive_failures = 0;
        guard.consecutive_successes = 0;
        guard.opened_at = None;
        drop(guard);
        if from != CircuitState::Closed {
            self.emit_transition(from, CircuitState::Closed);
        }
    }

    pub fn metrics(&self) -> CircuitMetrics {
        let guard = self.inner.lock();
        CircuitMetrics {
            state: guard.state,
            consecutive_failures: guard.consecutive_failures,
            consecutive_successes: guard.consecutive_successes,
            opened_at: guard.opened_at,
        }
    }

    pub fn opened_ago(&self) -> Option<Duration> {
        self.inner.lock().opened_at.map(|at| at.elapsed())
    }

    fn emit_transition(&self, from: CircuitState, to: CircuitState) {
        #[cfg(feature = "tracing")]
        tracing::info!(?from, ?to, "circuit breaker state transition");

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(
                "spooled_circuitbreaker_transitions_total",
                "from" => state_label(from),
                "to" => state_label(to)
            )
            .increment(1);
        }

        self.events.emit(&CircuitBreakerEvent::StateTransition {
            timestamp: Instant::now(),
            from,
            to,
        });
    }
}

#[cfg(feature = "metrics")]
fn state_label(state: CircuitState) -> &'static str {
    match state {
        CircuitState::Closed => "closed",
        CircuitState::Open => "open",
        CircuitState::HalfOpen => "half_open",
    }
}
