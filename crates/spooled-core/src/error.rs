//! The unified error taxonomy surfaced by the transport, worker, and
//! realtime cores.
//!
//! Every error that crosses an SDK boundary is a [`SpooledError`] variant.
//! The transport core is the only place most variants are constructed;
//! [`SpooledError::CircuitOpen`] is synthesised locally by the circuit
//! breaker and never by the transport.

use std::collections::HashMap;
use std::time::Duration;

/// Unified error type for all Spooled SDK operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpooledError {
    /// 401: credentials invalid or expired. Never retried.
    #[error("authentication failed{}", request_id.as_deref().map(|id| format!(" (request {id})")).unwrap_or_default())]
    Authentication {
        /// Server-assigned request id, if the response carried one.
        request_id: Option<String>,
    },

    /// 404: resource absent.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        request_id: Option<String>,
    },

    /// 400/422: per-field validation failures.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        fields: HashMap<String, String>,
        request_id: Option<String>,
    },

    /// 409: the requested mutation conflicts with current server state.
    #[error("conflict: {reason}")]
    Conflict {
        reason: String,
        request_id: Option<String>,
    },

    /// 429: caller is being throttled.
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimit {
        retry_after_seconds: u64,
        request_id: Option<String>,
    },

    /// 403 with plan-limit payload.
    #[error("plan limit exceeded: {current}/{limit} ({plan_tier})")]
    PlanLimit {
        limit: u64,
        current: u64,
        plan_tier: String,
        request_id: Option<String>,
    },

    /// Synthesised locally by the circuit breaker; the call never reached
    /// the executor.
    #[error("circuit open since {opened_ago:?} ago ({failure_count} failures)")]
    CircuitOpen {
        opened_ago: Duration,
        failure_count: u32,
    },

    /// Transport-level connectivity failure (DNS, connect refused, reset).
    #[error("network error: {message}")]
    Network { message: String },

    /// Connect or read timeout.
    #[error("timeout after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Any other non-2xx response not covered above.
    #[error("request failed with status {status_code}: {message}")]
    Generic {
        status_code: u16,
        message: String,
        request_id: Option<String>,
    },
}

impl SpooledError {
    /// A caller-facing hint: should this request be retried?
    ///
    /// Mirrors the retry policy's own classification so callers that bypass
    /// the transport's built-in retry (e.g. after catching the final error)
    /// can still make a sound decision.
    pub fn is_retryable(&self) -> bool {
        match self {
            SpooledError::Authentication { .. }
            | SpooledError::NotFound { .. }
            | SpooledError::Validation { .. }
            | SpooledError::Conflict { .. } => false,
            SpooledError::RateLimit { .. }
            | SpooledError::CircuitOpen { .. }
            | SpooledError::Network { .. }
            | SpooledError::Timeout { .. } => true,
            SpooledError::PlanLimit { .. } => false,
            SpooledError::Generic { status_code, .. } => {
                *status_code == 429 || (*status_code >= 500 && *status_code != 501)
            }
        }
    }

    /// The HTTP status code this error corresponds to, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SpooledError::Authentication { .. } => Some(401),
            SpooledError::NotFound { .. } => Some(404),
            SpooledError::Validation { .. } => Some(400),
            SpooledError::Conflict { .. } => Some(409),
            SpooledError::RateLimit { .. } => Some(429),
            SpooledError::PlanLimit { .. } => Some(403),
            SpooledError::Generic { status_code, .. } => Some(*status_code),
            SpooledError::CircuitOpen { .. }
            | SpooledError::Network { .. }
            | SpooledError::Timeout { .. } => None,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, SpooledError::CircuitOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_never_retryable() {
        let errs = [
            SpooledError::Authentication { request_id: None },
            SpooledError::NotFound {
                message: "job".into(),
                request_id: None,
            },
            SpooledError::Validation {
                message: "bad".into(),
                fields: HashMap::new(),
                request_id: None,
            },
            SpooledError::Conflict {
                reason: "already claimed".into(),
                request_id: None,
            },
            SpooledError::PlanLimit {
                limit: 10,
                current: 10,
                plan_tier: "free".into(),
                request_id: None,
            },
        ];
        for err in errs {
            assert!(!err.is_retryable(), "{err:?} should not be retryable");
        }
    }

    #[test]
    fn transient_errors_are_retryable() {
        let errs = [
            SpooledError::RateLimit {
                retry_after_seconds: 5,
                request_id: None,
            },
            SpooledError::CircuitOpen {
                opened_ago: Duration::from_secs(1),
                failure_count: 3,
            },
            SpooledError::Network {
                message: "connection reset".into(),
            },
            SpooledError::Timeout {
                elapsed: Duration::from_secs(10),
            },
        ];
        for err in errs {
            assert!(err.is_retryable(), "{err:?} should be retryable");
        }
    }

    #[test]
    fn generic_5xx_is_retryable_except_501() {
        let retryable = SpooledError::Generic {
            status_code: 503,
            message: "unavailable".into(),
            request_id: None,
        };
        assert!(retryable.is_retryable());

        let not_implemented = SpooledError::Generic {
            status_code: 501,
            message: "not implemented".into(),
            request_id: None,
        };
        assert!(!not_implemented.is_retryable());
    }
}
