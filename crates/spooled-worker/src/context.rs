use spooled_core::SpooledError;
use spooled_transport::HttpTransport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The view of a claimed job a [`crate::JobHandler`] is given to act on.
pub struct JobContext {
    pub job_id: String,
    pub queue_name: String,
    pub payload: serde_json::Value,
    pub retry_count: u32,
    pub max_retries: u32,
    pub worker_id: String,
    shutdown: CancellationToken,
    transport: Arc<HttpTransport>,
}

impl JobContext {
    pub(crate) fn new(
        job_id: String,
        queue_name: String,
        payload: serde_json::Value,
        retry_count: u32,
        max_retries: u32,
        worker_id: String,
        shutdown: CancellationToken,
        transport: Arc<HttpTransport>,
    ) -> Self {
        Self {
            job_id,
            queue_name,
            payload,
            retry_count,
            max_retries,
            worker_id,
            shutdown,
            transport,
        }
    }

    /// True once the runtime has observed `stop()`. Long-running handlers
    /// should poll this and wind down cooperatively.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Reports incremental progress on the job. Best-effort: failures are
    /// returned to the caller rather than panicking the handler.
    pub async fn progress(&self, percent: u8, note: Option<String>) -> Result<(), SpooledError> {
        let body = serde_json::json!({
            "percent": percent.min(100),
            "note": note,
        });
        self.transport
            .post(&format!("jobs/{}/progress", self.job_id), body)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spooled_transport::TransportConfig;

    fn ctx() -> JobContext {
        let config = TransportConfig::new("http://localhost:9", Default::default());
        let transport = Arc::new(HttpTransport::new(&config).unwrap());
        JobContext::new(
            "job-1".into(),
            "emails".into(),
            serde_json::json!({"to": "a@example.com"}),
            0,
            3,
            "worker-1".into(),
            CancellationToken::new(),
            transport,
        )
    }

    #[test]
    fn not_shutting_down_initially() {
        assert!(!ctx().is_shutting_down());
    }

    #[test]
    fn shutting_down_reflects_token() {
        let context = ctx();
        let token = context.shutdown.clone();
        token.cancel();
        assert!(context.is_shutting_down());
    }
}
