use crate::circuit::CircuitState;
use spooled_core::events::SpooledEvent;
use std::time::Instant;

/// Events emitted as the breaker transitions between states or rejects a call.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    StateTransition {
        timestamp: Instant,
        from: CircuitState,
        to: CircuitState,
    },
    CallRejected {
        timestamp: Instant,
    },
}

impl SpooledEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp } => *timestamp,
        }
    }
}
