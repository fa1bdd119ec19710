use spooled_core::events::SpooledEvent;
use std::time::Instant;

/// The closed set of connection lifecycle events a [`crate::RealtimeClient`] emits.
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    Connected {
        timestamp: Instant,
    },
    Reconnecting {
        timestamp: Instant,
        delay: std::time::Duration,
        attempt: u32,
    },
    Error {
        timestamp: Instant,
        message: String,
    },
    Stopped {
        timestamp: Instant,
    },
}

impl RealtimeEvent {
    pub(crate) fn connected() -> Self {
        RealtimeEvent::Connected {
            timestamp: Instant::now(),
        }
    }

    pub(crate) fn reconnecting(delay: std::time::Duration, attempt: u32) -> Self {
        RealtimeEvent::Reconnecting {
            timestamp: Instant::now(),
            delay,
            attempt,
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        RealtimeEvent::Error {
            timestamp: Instant::now(),
            message: message.into(),
        }
    }

    pub(crate) fn stopped() -> Self {
        RealtimeEvent::Stopped {
            timestamp: Instant::now(),
        }
    }
}

impl SpooledEvent for RealtimeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RealtimeEvent::Connected { .. } => "connected",
            RealtimeEvent::Reconnecting { .. } => "reconnecting",
            RealtimeEvent::Error { .. } => "error",
            RealtimeEvent::Stopped { .. } => "stopped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RealtimeEvent::Connected { timestamp }
            | RealtimeEvent::Reconnecting { timestamp, .. }
            | RealtimeEvent::Error { timestamp, .. }
            | RealtimeEvent::Stopped { timestamp } => *timestamp,
        }
    }
}
