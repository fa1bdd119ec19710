//! Retry policy for the Spooled SDK transport.
//!
//! [`RetryPolicy`] decides whether a failed call is eligible for another
//! attempt and computes the jittered, possibly `Retry-After`-driven delay
//! before it. This crate does not drive the retry loop itself, the
//! transport core owns the physical call and composes the policy with the
//! circuit breaker around it, but it does provide [`sleep_cancelable`], the
//! same cancellation-aware sleep the worker and realtime cores use for their
//! own waits.

mod config;
mod events;
mod policy;

pub use config::RetryConfig;
pub use events::RetryEvent;
pub use policy::{RetryAfter, RetryContext, RetryMethod, RetryPolicy};

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleeps for `duration`, or returns early if `token` is cancelled.
///
/// Returns `true` if the sleep ran to completion, `false` if it was cut
/// short by cancellation.
pub async fn sleep_cancelable(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = token.cancelled() => false,
    }
}
