use spooled_core::events::SpooledEvent;
use std::time::{Duration, Instant};

/// Events emitted by the retry policy as it drives a call through its
/// attempts.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry attempt is about to be made, after the given delay.
    Retry {
        timestamp: Instant,
        attempt: u32,
        delay: Duration,
    },
    /// The call succeeded, possibly after retries.
    Success { timestamp: Instant, attempts: u32 },
    /// The call failed after exhausting all retries.
    Exhausted { timestamp: Instant, attempts: u32 },
    /// An error occurred but was not eligible for retry.
    NotRetryable { timestamp: Instant },
}

impl SpooledEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::NotRetryable { .. } => "not_retryable",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::NotRetryable { timestamp } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names() {
        let now = Instant::now();
        assert_eq!(
            RetryEvent::Retry {
                timestamp: now,
                attempt: 1,
                delay: Duration::from_millis(100)
            }
            .event_type(),
            "retry"
        );
        assert_eq!(
            RetryEvent::Success {
                timestamp: now,
                attempts: 1
            }
            .event_type(),
            "success"
        );
        assert_eq!(
            RetryEvent::Exhausted {
                timestamp: now,
                attempts: 3
            }
            .event_type(),
            "exhausted"
        );
        assert_eq!(RetryEvent::NotRetryable { timestamp: now }.event_type(), "not_retryable");
    }
}
