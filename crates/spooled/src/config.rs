use spooled_circuitbreaker::CircuitBreakerConfig;
use spooled_retry::RetryConfig;
use spooled_transport::{CredentialSet, TransportConfig};
use std::collections::HashMap;
use std::time::Duration;

/// The configuration surface for a [`crate::SpooledClient`]: every runtime
/// knob spelled out as a flat struct, convertible into a [`TransportConfig`].
#[derive(Debug, Clone)]
pub struct SpooledConfig {
    pub base_url: String,
    pub ws_url: Option<String>,
    pub rpc_address: Option<String>,
    pub credentials: CredentialSet,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
    pub circuit: CircuitBreakerConfig,
    pub headers: HashMap<String, String>,
}

impl SpooledConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ws_url: None,
            rpc_address: None,
            credentials: CredentialSet::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            circuit: CircuitBreakerConfig::default(),
            headers: HashMap::new(),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.base_url.clone(),
            ws_url: self.ws_url.clone(),
            rpc_address: self.rpc_address.clone(),
            credentials: self.credentials.clone(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            retry: self.retry.clone(),
            circuit_breaker: self.circuit.clone(),
            default_headers: self.headers.clone(),
        }
    }
}

/// Applies `SPOOLED_API_KEY`, `SPOOLED_API_URL`, `SPOOLED_WS_URL`,
/// `SPOOLED_RPC_ADDRESS`, and `SPOOLED_TIMEOUT` (seconds, applied to both
/// `connect_timeout` and `request_timeout`) over `config`, when present in
/// the environment. Never called implicitly - an explicit opt-in the host
/// calls after constructing its own [`SpooledConfig`].
pub fn load_env_overrides(config: &mut SpooledConfig) {
    if let Ok(api_key) = std::env::var("SPOOLED_API_KEY") {
        config.credentials.api_key = Some(api_key);
    }
    if let Ok(api_url) = std::env::var("SPOOLED_API_URL") {
        config.base_url = api_url;
    }
    if let Ok(ws_url) = std::env::var("SPOOLED_WS_URL") {
        config.ws_url = Some(ws_url);
    }
    if let Ok(rpc_address) = std::env::var("SPOOLED_RPC_ADDRESS") {
        config.rpc_address = Some(rpc_address);
    }
    if let Ok(timeout) = std::env::var("SPOOLED_TIMEOUT") {
        if let Ok(seconds) = timeout.parse::<u64>() {
            let duration = Duration::from_secs(seconds);
            config.connect_timeout = duration;
            config.request_timeout = duration;
        }
    }
}
