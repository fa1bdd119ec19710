use crate::config::RetryConfig;
use rand::Rng;
use std::time::{Duration, SystemTime};

/// A server-supplied `Retry-After` hint, already parsed out of either its
/// delta-seconds or HTTP-date form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryAfter {
    Seconds(u64),
    At(SystemTime),
}

impl RetryAfter {
    /// Parses a raw `Retry-After` header value. Returns `None` for anything
    /// that is neither a valid delta-seconds integer nor a valid HTTP-date.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(secs) = trimmed.parse::<u64>() {
            return Some(RetryAfter::Seconds(secs));
        }
        httpdate::parse_http_date(trimmed).ok().map(RetryAfter::At)
    }

    fn as_duration(&self, now: SystemTime) -> Duration {
        match self {
            RetryAfter::Seconds(secs) => Duration::from_secs(*secs),
            RetryAfter::At(at) => at.duration_since(now).unwrap_or(Duration::ZERO),
        }
    }
}

/// The HTTP method of the call under consideration, used by the
/// method-based half of the retry-eligibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMethod {
    Get,
    Put,
    Delete,
    Post,
    Patch,
}

impl RetryMethod {
    fn is_idempotent_by_default(self) -> bool {
        matches!(self, RetryMethod::Get | RetryMethod::Put | RetryMethod::Delete)
    }
}

/// Everything the policy needs to classify one failed call.
#[derive(Debug, Clone, Copy)]
pub struct RetryContext {
    pub method: RetryMethod,
    /// HTTP status code, if the failure carried one (absent for connect/DNS errors).
    pub status: Option<u16>,
    /// Set for connection-level failures: DNS, refused, reset, timeout.
    pub network_or_timeout: bool,
    /// The caller explicitly opted this specific call into retries, overriding
    /// the method-based default (e.g. the raw webhook-forwarding POST path).
    pub force_retry: bool,
}

/// Decides whether a failed call should be retried and, if so, after how long.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Method- and status-based eligibility rule.
    pub fn should_retry(&self, ctx: &RetryContext) -> bool {
        let method_allows = ctx.method.is_idempotent_by_default() || ctx.force_retry;
        if !method_allows {
            return false;
        }

        match ctx.status {
            None => ctx.network_or_timeout,
            Some(429) => true,
            Some(501) => false,
            Some(status) if (500..600).contains(&status) => true,
            Some(400 | 401 | 403 | 404 | 409 | 422) => false,
            Some(_) => ctx.network_or_timeout,
        }
    }

    /// `true` once `attempt` (0-based, the attempt that just failed) has used
    /// up the configured retry budget.
    pub fn exhausted(&self, attempt: u32) -> bool {
        attempt >= self.config.max_retries
    }

    /// Computes the delay before the next attempt.
    ///
    /// `attempt` is the 0-based index of the attempt that just failed. When
    /// `retry_after` is present it takes priority over the exponential
    /// schedule, but is still clamped to `max_delay` and still jittered.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<RetryAfter>) -> Duration {
        let base = match retry_after {
            Some(hint) => hint.as_duration(SystemTime::now()).min(self.config.max_delay),
            None => {
                let scaled = self.config.base_delay.as_secs_f64() * self.config.factor.powi(attempt as i32);
                Duration::from_secs_f64(scaled).min(self.config.max_delay)
            }
        };

        if self.config.jitter <= 0.0 {
            return base;
        }

        let jitter_fraction: f64 = rand::rng().random_range(0.0..=self.config.jitter);
        base.mul_f64(1.0 + jitter_fraction)
    }
}
