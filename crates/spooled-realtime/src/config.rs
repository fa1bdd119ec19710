use spooled_transport::CredentialSet;
use std::time::Duration;

/// Configuration for a [`crate::RealtimeClient`] connecting to a single endpoint.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// The line-delimited push endpoint, e.g. `https://api.spooled.dev/api/v1/events`.
    pub push_url: String,
    /// The duplex endpoint. Defaults to `push_url`'s host with the scheme
    /// swapped to `ws`/`wss` and the path replaced with `/api/v1/ws`.
    pub ws_url: Option<String>,
    pub credentials: CredentialSet,
    /// Initial backoff before the first reconnect attempt.
    pub base_delay: Duration,
    /// Upper bound a reconnect delay never exceeds regardless of attempt count.
    pub max_delay: Duration,
    pub connect_timeout: Duration,
    /// Send credentials as `?api_key=`/`?token=` query parameters instead of
    /// an `Authorization` header, for transports that don't permit headers.
    pub auth_via_query: bool,
}

impl RealtimeConfig {
    pub fn new(push_url: impl Into<String>, credentials: CredentialSet) -> Self {
        Self {
            push_url: push_url.into(),
            ws_url: None,
            credentials,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            auth_via_query: false,
        }
    }

    /// Derives the websocket URL from `push_url` when `ws_url` is unset,
    /// swapping `http(s)` for `ws(s)` and the path for `/api/v1/ws`.
    pub fn resolved_ws_url(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let swapped = if let Some(rest) = self.push_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.push_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.push_url.clone()
        };
        match url::Url::parse(&swapped) {
            Ok(mut parsed) => {
                parsed.set_path("/api/v1/ws");
                parsed.set_query(None);
                parsed.into()
            }
            Err(_) => swapped,
        }
    }
}
