use crate::auth::CredentialSet;
use spooled_circuitbreaker::CircuitBreakerConfig;
use spooled_retry::RetryConfig;
use std::collections::HashMap;
use std::time::Duration;

/// Everything a [`crate::Transport`] needs to talk to the Spooled API.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    /// Defaults to `base_url` with the scheme swapped to `ws`/`wss` when absent.
    pub ws_url: Option<String>,
    pub rpc_address: Option<String>,
    pub credentials: CredentialSet,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub default_headers: HashMap<String, String>,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>, credentials: CredentialSet) -> Self {
        Self {
            base_url: base_url.into(),
            ws_url: None,
            rpc_address: None,
            credentials,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            default_headers: HashMap::new(),
        }
    }

    /// Derives the websocket URL from `base_url` when `ws_url` is unset,
    /// swapping `http(s)` for `ws(s)`.
    pub fn resolved_ws_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        }
    }
}
