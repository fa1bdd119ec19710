use std::time::Duration;

/// Configuration for a [`crate::WorkerRuntime`] processing a single queue.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub queue_name: String,
    pub concurrency: usize,
    pub poll_interval: Duration,
    pub lease_duration: Duration,
    /// How often the worker-level heartbeat fires, independent of any job.
    pub heartbeat_interval: Duration,
    /// Fraction of `lease_duration` between per-job lease renewals.
    pub heartbeat_fraction: f64,
    pub shutdown_timeout: Duration,
    pub hostname: String,
    pub worker_type: Option<String>,
    pub version: Option<String>,
    pub metadata: serde_json::Value,
    pub auto_start: bool,
}

impl WorkerConfig {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            concurrency: 5,
            poll_interval: Duration::from_secs(1),
            lease_duration: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(15),
            heartbeat_fraction: 0.5,
            shutdown_timeout: Duration::from_secs(30),
            hostname: hostname_or_unknown(),
            worker_type: None,
            version: None,
            metadata: serde_json::json!({}),
            auto_start: false,
        }
    }
}

fn hostname_or_unknown() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}
