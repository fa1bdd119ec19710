use crate::config::SpooledConfig;
use spooled_transport::HttpTransport;
use std::sync::Arc;

#[cfg(feature = "worker")]
use spooled_worker::{JobHandler, WorkerConfig, WorkerRuntime};

#[cfg(feature = "realtime")]
use spooled_realtime::{RealtimeClient, RealtimeConfig};

/// Entry point for the Spooled client-side runtime: owns the shared
/// transport and constructs the optional worker and realtime runtimes on
/// top of it.
///
/// Resource methods (jobs, queues, schedules, and the rest of the REST
/// catalogue) are out of scope here; callers reach them through
/// [`SpooledClient::transport`] directly.
pub struct SpooledClient {
    transport: Arc<HttpTransport>,
    config: SpooledConfig,
}

impl SpooledClient {
    pub fn new(config: SpooledConfig) -> reqwest::Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.transport_config())?);
        Ok(Self { transport, config })
    }

    /// The shared HTTP transport, for resource-facade callers built on top
    /// of this runtime.
    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    pub fn config(&self) -> &SpooledConfig {
        &self.config
    }

    /// Builds a [`WorkerRuntime`] processing `config.queue_name` against
    /// this client's shared transport.
    #[cfg(feature = "worker")]
    pub fn worker(
        &self,
        config: WorkerConfig,
        handler: impl JobHandler + 'static,
    ) -> WorkerRuntime {
        WorkerRuntime::new(config, Arc::clone(&self.transport), handler)
    }

    /// A [`RealtimeConfig`] seeded from this client's `base_url`,
    /// `ws_url`, and credentials - `/api/v1/events` appended as the push
    /// endpoint. Callers can tweak the result before passing it to
    /// [`SpooledClient::realtime`].
    #[cfg(feature = "realtime")]
    pub fn realtime_config(&self) -> RealtimeConfig {
        let push_url = format!(
            "{}/api/v1/events",
            self.config.base_url.trim_end_matches('/')
        );
        let mut config = RealtimeConfig::new(push_url, self.config.credentials.clone());
        config.ws_url = self.config.ws_url.clone();
        config
    }

    /// Builds a [`RealtimeClient`] subscribing to the given endpoint.
    #[cfg(feature = "realtime")]
    pub fn realtime(&self, config: RealtimeConfig) -> RealtimeClient {
        RealtimeClient::new(config)
    }
}
