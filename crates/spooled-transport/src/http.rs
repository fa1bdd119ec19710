use crate::auth::Authenticator;
use crate::config::TransportConfig;
use crate::error::status_to_error;
use reqwest::Client;
use spooled_circuitbreaker::Circuit;
use spooled_core::case;
use spooled_core::SpooledError;
use spooled_retry::{RetryAfter, RetryContext, RetryMethod, RetryPolicy};
use std::collections::HashMap;
use std::time::Duration;

/// Per-call overrides to the default request pipeline.
#[derive(Debug, Clone, Default)]
pub struct RequestFlags {
    /// Attaches the admin-key header in addition to the normal auth header.
    pub is_admin_resource: bool,
    /// Opts a non-idempotent method (`POST`/`PATCH`) into retry eligibility.
    pub force_retry: bool,
    /// Skips the `api/v1/` path prefix.
    pub skip_path_prefix: bool,
}

/// The HTTP backend of the Spooled transport: case conversion, auth, and
/// the retry/circuit-breaker pipeline wrapped around `reqwest`.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    default_headers: HashMap<String, String>,
    auth: Authenticator,
    circuit: Circuit,
    retry: RetryPolicy,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_headers: config.default_headers.clone(),
            auth: Authenticator::new(config.credentials.clone()),
            circuit: Circuit::new(config.circuit_breaker.clone()),
            retry: RetryPolicy::new(config.retry.clone()),
        })
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        self.auth.set_access_token(token);
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        self.auth.set_refresh_token(token);
    }

    pub async fn get(&self, path: &str) -> Result<serde_json::Value, SpooledError> {
        self.request(http::Method::GET, path, None, None, RequestFlags::default()).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SpooledError> {
        self.request(http::Method::POST, path, Some(body), None, RequestFlags::default())
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SpooledError> {
        self.request(http::Method::PUT, path, Some(body), None, RequestFlags::default())
            .await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SpooledError> {
        self.request(http::Method::PATCH, path, Some(body), None, RequestFlags::default())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<serde_json::Value, SpooledError> {
        self.request(http::Method::DELETE, path, None, None, RequestFlags::default())
            .await
    }

    /// Sends caller-supplied bytes verbatim: no case conversion, no JSON
    /// encoding, retry forced on regardless of method. Used for forwarding
    /// signed third-party webhook payloads where the body bytes are part of
    /// the signature.
    pub async fn raw_post(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> Result<serde_json::Value, SpooledError> {
        let flags = RequestFlags {
            force_retry: true,
            ..RequestFlags::default()
        };
        self.execute(http::Method::POST, path, RawOrJson::Raw(body), flags).await
    }

    pub async fn request(
        &self,
        method: http::Method,
        path: &str,
        body: Option<serde_json::Value>,
        query: Option<&[(&str, &str)]>,
        flags: RequestFlags,
    ) -> Result<serde_json::Value, SpooledError> {
        let wire_body = body.as_ref().map(case::to_wire);
        let url = self.build_url(path, query, flags.skip_path_prefix)?;
        self.execute_at(method, url, wire_body.map(RawOrJson::Json), flags).await
    }

    async fn execute(
        &self,
        method: http::Method,
        path: &str,
        body: RawOrJson,
        flags: RequestFlags,
    ) -> Result<serde_json::Value, SpooledError> {
        let url = self.build_url(path, None, flags.skip_path_prefix)?;
        self.execute_at(method, url, Some(body), flags).await
    }

    fn build_url(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        skip_prefix: bool,
    ) -> Result<url::Url, SpooledError> {
        let prefix = if skip_prefix { "" } else { "api/v1/" };
        let joined = format!("{}/{}{}", self.base_url, prefix, path.trim_start_matches('/'));
        let mut url = url::Url::parse(&joined).map_err(|e| SpooledError::Generic {
            status_code: 0,
            message: format!("invalid request URL: {e}"),
            request_id: None,
        })?;
        if let Some(pairs) = query {
            let mut qp = url.query_pairs_mut();
            for (key, value) in pairs {
                qp.append_pair(&wire_key(key), value);
            }
        }
        Ok(url)
    }

    async fn execute_at(
        &self,
        method: http::Method,
        url: url::Url,
        body: Option<RawOrJson>,
        flags: RequestFlags,
    ) -> Result<serde_json::Value, SpooledError> {
        if !self.circuit.try_acquire() {
            let metrics = self.circuit.metrics();
            return Err(SpooledError::CircuitOpen {
                opened_ago: metrics.opened_at.map(|at| at.elapsed()).unwrap_or_default(),
                failure_count: metrics.consecutive_failures,
            });
        }

        let retry_method = to_retry_method(&method);
        let mut attempt: u32 = 0;

        loop {
            let outcome = self.one_attempt(method.clone(), url.clone(), body.clone(), &flags).await;

            match outcome {
                Ok(value) => {
                    self.circuit.record_success();
                    return Ok(value);
                }
                Err((err, status, network_or_timeout, retry_after)) => {
                    self.circuit.record_failure(status, network_or_timeout);

                    let ctx = RetryContext {
                        method: retry_method,
                        status,
                        network_or_timeout,
                        force_retry: flags.force_retry,
                    };

                    if !self.retry.should_retry(&ctx) || self.retry.exhausted(attempt) {
                        return Err(err);
                    }

                    let delay = self.retry.delay_for(attempt, retry_after);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    #[allow(clippy::type_complexity)]
    async fn one_attempt(
        &self,
        method: http::Method,
        url: url::Url,
        body: Option<RawOrJson>,
        flags: &RequestFlags,
    ) -> Result<serde_json::Value, (SpooledError, Option<u16>, bool, Option<RetryAfter>)> {
        let mut builder = self.client.request(reqwest_method(&method), url);

        for (key, value) in &self.default_headers {
            builder = builder.header(key, value);
        }

        let (auth_header, admin_header) = self.auth.header_for(flags.is_admin_resource);
        if let Some((name, value)) = auth_header {
            builder = builder.header(name, value);
        }
        if let Some((name, value)) = admin_header {
            builder = builder.header(name, value);
        }

        builder = match &body {
            Some(RawOrJson::Json(value)) => builder.json(value),
            Some(RawOrJson::Raw(bytes)) => builder.body(bytes.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            let timeout = e.is_timeout();
            let err = if timeout {
                SpooledError::Timeout { elapsed: Duration::ZERO }
            } else {
                SpooledError::Network { message: e.to_string() }
            };
            (err, None, true, None)
        })?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(RetryAfter::parse);

        if status.as_u16() >= 400 {
            let raw_body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<serde_json::Value>(&raw_body).ok();
            let caller_body = parsed.as_ref().map(case::from_wire);
            let err = status_to_error(status.as_u16(), caller_body.as_ref(), request_id);
            return Err((err, Some(status.as_u16()), false, retry_after));
        }

        let raw_body = response.text().await.map_err(|e| {
            (
                SpooledError::Network { message: e.to_string() },
                Some(status.as_u16()),
                false,
                None,
            )
        })?;

        if raw_body.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }

        let parsed: serde_json::Value = serde_json::from_str(&raw_body).map_err(|e| {
            (
                SpooledError::Generic {
                    status_code: status.as_u16(),
                    message: format!("invalid JSON response: {e}"),
                    request_id: None,
                },
                Some(status.as_u16()),
                false,
                None,
            )
        })?;

        Ok(case::from_wire(&parsed))
    }
}

#[derive(Debug, Clone)]
enum RawOrJson {
    Json(serde_json::Value),
    Raw(Vec<u8>),
}

fn to_retry_method(method: &http::Method) -> RetryMethod {
    match *method {
        http::Method::GET => RetryMethod::Get,
        http::Method::PUT => RetryMethod::Put,
        http::Method::DELETE => RetryMethod::Delete,
        http::Method::PATCH => RetryMethod::Patch,
        _ => RetryMethod::Post,
    }
}

fn reqwest_method(method: &http::Method) -> reqwest::Method {
    reqwest::Method::from_bytes(method.as_str().as_bytes()).unwrap_or(reqwest::Method::GET)
}

/// Renames a single query-string key via the same `lowerCamel` -> `lower_snake`
/// rule applied to request bodies, by round-tripping it through a one-key object.
fn wire_key(key: &str) -> String {
    let wrapped = serde_json::json!({ key: serde_json::Value::Null });
    let wire = case::to_wire(&wrapped);
    wire.as_object()
        .and_then(|m| m.keys().next())
        .cloned()
        .unwrap_or_else(|| key.to_string())
}
