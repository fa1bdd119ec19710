use spooled_core::SpooledError;
use std::collections::HashMap;

/// Maps a completed (non-2xx) HTTP response onto the unified error taxonomy.
///
/// `body` is the already-decoded, case-converted JSON body, if any; it
/// supplies the per-error-kind payload (field errors, retry-after seconds,
/// plan-limit counters, ...).
pub fn status_to_error(
    status: u16,
    body: Option<&serde_json::Value>,
    request_id: Option<String>,
) -> SpooledError {
    let message = body
        .and_then(|b| b.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("request failed")
        .to_string();

    match status {
        401 => SpooledError::Authentication { request_id },
        404 => SpooledError::NotFound { message, request_id },
        400 | 422 => SpooledError::Validation {
            message,
            fields: field_errors(body),
            request_id,
        },
        409 => SpooledError::Conflict {
            reason: message,
            request_id,
        },
        429 => SpooledError::RateLimit {
            retry_after_seconds: body
                .and_then(|b| b.get("retryAfterSeconds"))
                .and_then(|v| v.as_u64())
                .unwrap_or(1),
            request_id,
        },
        403 if body.and_then(|b| b.get("planTier")).is_some() => SpooledError::PlanLimit {
            limit: body.and_then(|b| b.get("limit")).and_then(|v| v.as_u64()).unwrap_or(0),
            current: body.and_then(|b| b.get("current")).and_then(|v| v.as_u64()).unwrap_or(0),
            plan_tier: body
                .and_then(|b| b.get("planTier"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            request_id,
        },
        status => SpooledError::Generic {
            status_code: status,
            message,
            request_id,
        },
    }
}

fn field_errors(body: Option<&serde_json::Value>) -> HashMap<String, String> {
    body.and_then(|b| b.get("fields"))
        .and_then(|f| f.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Maps a gRPC status code onto the same taxonomy the HTTP transport uses.
#[cfg(feature = "rpc")]
pub fn grpc_status_to_error(status: &tonic::Status) -> SpooledError {
    use tonic::Code;

    let message = status.message().to_string();
    match status.code() {
        Code::NotFound => SpooledError::NotFound {
            message,
            request_id: None,
        },
        Code::Unauthenticated => SpooledError::Authentication { request_id: None },
        Code::InvalidArgument => SpooledError::Validation {
            message,
            fields: HashMap::new(),
            request_id: None,
        },
        Code::ResourceExhausted => SpooledError::PlanLimit {
            limit: 0,
            current: 0,
            plan_tier: "unknown".to_string(),
            request_id: None,
        },
        Code::DeadlineExceeded => SpooledError::Timeout {
            elapsed: std::time::Duration::ZERO,
        },
        Code::Unavailable => SpooledError::Network { message },
        _ => SpooledError::Generic {
            status_code: 500,
            message,
            request_id: None,
        },
    }
}
