//! HTTP and RPC transport for the Spooled SDK.
//!
//! [`HttpTransport`] is the default backend: it owns case conversion,
//! authentication, and the retry/circuit-breaker pipeline around a
//! [`reqwest::Client`]. When the `rpc` feature is enabled, [`rpc::RpcTransport`]
//! mirrors the same operations over a lazily-established gRPC channel.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;

#[cfg(feature = "rpc")]
pub mod rpc;

pub use auth::{Authenticator, CredentialSet};
pub use config::TransportConfig;
pub use http::{HttpTransport, RequestFlags};

#[cfg(feature = "rpc")]
pub use rpc::RpcTransport;

/// Chooses HTTP or RPC per call depending on which backend implements the
/// requested operation. `spooled-worker` and the resource-level client use
/// this facade rather than reaching for a specific backend directly.
pub enum Transport {
    Http(HttpTransport),
    #[cfg(feature = "rpc")]
    Rpc(RpcTransport),
}

impl Transport {
    pub fn http(config: &TransportConfig) -> reqwest::Result<Self> {
        Ok(Transport::Http(HttpTransport::new(config)?))
    }

    #[cfg(feature = "rpc")]
    pub fn rpc(config: &TransportConfig) -> Self {
        let address = config
            .rpc_address
            .clone()
            .unwrap_or_else(|| config.base_url.clone());
        Transport::Rpc(RpcTransport::new(
            address,
            config.connect_timeout,
            config.credentials.clone(),
        ))
    }

    pub fn as_http(&self) -> Option<&HttpTransport> {
        match self {
            Transport::Http(t) => Some(t),
            #[cfg(feature = "rpc")]
            Transport::Rpc(_) => None,
        }
    }

    #[cfg(feature = "rpc")]
    pub fn as_rpc(&self) -> Option<&RpcTransport> {
        match self {
            Transport::Rpc(t) => Some(t),
            Transport::Http(_) => None,
        }
    }
}
