use crate::config::WorkerConfig;
use crate::context::JobContext;
use crate::events::WorkerEvent;
use crate::handler::{HandlerError, JobHandler};
use spooled_core::events::{EventListener, EventListeners};
use spooled_core::SpooledError;
use spooled_transport::HttpTransport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

struct ClaimedJob {
    job_id: String,
    payload: serde_json::Value,
    retry_count: u32,
    max_retries: u32,
}

/// Long-lived in-process job processor for a single queue: claims jobs under
/// a concurrency cap, dispatches them to a [`JobHandler`], renews leases
/// while they run, sends a periodic worker-level heartbeat, and drains
/// cleanly on [`WorkerRuntime::stop`].
pub struct WorkerRuntime {
    config: WorkerConfig,
    transport: Arc<HttpTransport>,
    handler: Arc<dyn JobHandler>,
    events: EventListeners<WorkerEvent>,
    shutdown: CancellationToken,
    in_flight: Arc<AtomicUsize>,
    /// job_id -> worker_id for every job currently dispatched, so `drain`
    /// can force-fail survivors still running when `shutdown_timeout` expires.
    in_flight_jobs: Arc<AsyncMutex<HashMap<String, String>>>,
    slot_freed: Arc<Notify>,
    degraded: Arc<AtomicBool>,
    worker_id: AsyncMutex<Option<String>>,
    /// Seconds; overridden by the server's registration response when present.
    lease_duration_secs: AtomicU64,
    heartbeat_interval_secs: AtomicU64,
}

impl WorkerRuntime {
    pub fn new(
        config: WorkerConfig,
        transport: Arc<HttpTransport>,
        handler: impl JobHandler + 'static,
    ) -> Self {
        let lease_duration_secs = config.lease_duration.as_secs();
        let heartbeat_interval_secs = config.heartbeat_interval.as_secs();
        Self {
            config,
            transport,
            handler: Arc::new(handler),
            events: EventListeners::new(),
            shutdown: CancellationToken::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            in_flight_jobs: Arc::new(AsyncMutex::new(HashMap::new())),
            slot_freed: Arc::new(Notify::new()),
            degraded: Arc::new(AtomicBool::new(false)),
            worker_id: AsyncMutex::new(None),
            lease_duration_secs: AtomicU64::new(lease_duration_secs),
            heartbeat_interval_secs: AtomicU64::new(heartbeat_interval_secs),
        }
    }

    fn lease_duration(&self) -> Duration {
        Duration::from_secs(self.lease_duration_secs.load(Ordering::SeqCst))
    }

    fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.load(Ordering::SeqCst))
    }

    fn renewal_interval(&self) -> Duration {
        self.lease_duration().mul_f64(self.config.heartbeat_fraction)
    }

    /// Subscribes a listener to lifecycle events (`started`, `stopped`,
    /// `error`, `job_claimed`, `job_started`, `job_completed`, `job_failed`).
    pub fn on<L>(mut self, listener: L) -> Self
    where
        L: EventListener<WorkerEvent> + 'static,
    {
        self.events.add(listener);
        self
    }

    /// Idempotent: signals the claim loop to stop and in-flight jobs to
    /// drain. Safe to call from another task while `start()` is running.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Runs until [`WorkerRuntime::stop`] is called or registration fails
    /// fatally. Registers the worker, then runs the claim loop and the
    /// worker heartbeat concurrently until shutdown, then drains.
    pub async fn start(self: Arc<Self>) -> Result<(), SpooledError> {
        self.register().await?;
        self.events.emit(&WorkerEvent::started());

        let dispatch_tasks: Arc<AsyncMutex<JoinSet<()>>> = Arc::new(AsyncMutex::new(JoinSet::new()));

        let mut background = JoinSet::new();
        background.spawn({
            let this = Arc::clone(&self);
            async move { this.heartbeat_loop().await }
        });
        background.spawn({
            let this = Arc::clone(&self);
            let dispatch_tasks = Arc::clone(&dispatch_tasks);
            async move { this.claim_loop(dispatch_tasks).await }
        });

        self.shutdown.cancelled().await;
        // Both background tasks observe cancellation and return on their own
        // (the heartbeat loop sends one final `draining` heartbeat first).
        while background.join_next().await.is_some() {}

        self.drain(dispatch_tasks).await;
        self.deregister().await;
        self.events.emit(&WorkerEvent::stopped());
        Ok(())
    }

    async fn register(&self) -> Result<(), SpooledError> {
        let body = serde_json::json!({
            "queueName": self.config.queue_name,
            "hostname": self.config.hostname,
            "concurrency": self.config.concurrency,
            "workerType": self.config.worker_type,
            "version": self.config.version,
            "metadata": self.config.metadata,
        });
        let response = self.transport.post("workers/register", body).await?;
        let id = response
            .get("workerId")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        *self.worker_id.lock().await = Some(id);

        if let Some(secs) = response.get("leaseDurationSecs").and_then(|v| v.as_u64()) {
            self.lease_duration_secs.store(secs, Ordering::SeqCst);
        }
        if let Some(secs) = response.get("heartbeatIntervalSecs").and_then(|v| v.as_u64()) {
            self.heartbeat_interval_secs.store(secs, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn deregister(&self) {
        let Some(worker_id) = self.worker_id.lock().await.clone() else {
            return;
        };
        let _ = self
            .transport
            .post(&format!("workers/{worker_id}/deregister"), serde_json::json!({}))
            .await;
    }

    async fn worker_id(&self) -> String {
        self.worker_id.lock().await.clone().unwrap_or_default()
    }

    async fn heartbeat_loop(self: Arc<Self>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.heartbeat_interval()) => {}
                _ = self.shutdown.cancelled() => {}
            }

            let worker_id = self.worker_id().await;
            if worker_id.is_empty() {
                continue;
            }

            let status = if self.shutdown.is_cancelled() {
                "draining"
            } else if self.degraded.load(Ordering::SeqCst) {
                "degraded"
            } else {
                "healthy"
            };

            let body = serde_json::json!({
                "currentJobs": self.in_flight.load(Ordering::SeqCst),
                "status": status,
            });
            let result = self
                .transport
                .post(&format!("workers/{worker_id}/heartbeat"), body)
                .await;
            if let Err(err) = result {
                self.events.emit(&WorkerEvent::error(err.to_string()));
            }

            if self.shutdown.is_cancelled() {
                return;
            }
        }
    }

    async fn claim_loop(self: Arc<Self>, dispatch_tasks: Arc<AsyncMutex<JoinSet<()>>>) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }

            let available = self
                .config
                .concurrency
                .saturating_sub(self.in_flight.load(Ordering::SeqCst));

            if available == 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    _ = self.slot_freed.notified() => {}
                    _ = self.shutdown.cancelled() => return,
                }
                continue;
            }

            match self.claim(available).await {
                Ok(jobs) if jobs.is_empty() => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                        _ = self.shutdown.cancelled() => return,
                    }
                }
                Ok(jobs) => {
                    let mut guard = dispatch_tasks.lock().await;
                    for job in jobs {
                        self.in_flight.fetch_add(1, Ordering::SeqCst);
                        self.events.emit(&WorkerEvent::job_claimed(job.job_id.clone()));
                        let this = Arc::clone(&self);
                        guard.spawn(async move { this.dispatch(job).await });
                    }
                }
                Err(err) => {
                    self.events.emit(&WorkerEvent::error(err.to_string()));
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                        _ = self.shutdown.cancelled() => return,
                    }
                }
            }
        }
    }

    async fn claim(&self, max_jobs: usize) -> Result<Vec<ClaimedJob>, SpooledError> {
        let worker_id = self.worker_id().await;
        let body = serde_json::json!({
            "queueName": self.config.queue_name,
            "workerId": worker_id,
            "maxJobs": max_jobs,
            "leaseDurationSecs": self.lease_duration().as_secs(),
        });
        let response = self.transport.post("jobs/claim", body).await?;
        let jobs = response
            .get("jobs")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(jobs
            .into_iter()
            .filter_map(|job| {
                let job_id = job.get("id")?.as_str()?.to_string();
                Some(ClaimedJob {
                    job_id,
                    payload: job.get("payload").cloned().unwrap_or(serde_json::Value::Null),
                    retry_count: job.get("retryCount").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
                    max_retries: job.get("maxRetries").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
                })
            })
            .collect())
    }

    async fn dispatch(self: Arc<Self>, job: ClaimedJob) {
        self.events.emit(&WorkerEvent::job_started(job.job_id.clone()));

        let worker_id = self.worker_id().await;
        self.in_flight_jobs
            .lock()
            .await
            .insert(job.job_id.clone(), worker_id.clone());

        let ctx = JobContext::new(
            job.job_id.clone(),
            self.config.queue_name.clone(),
            job.payload.clone(),
            job.retry_count,
            job.max_retries,
            worker_id.clone(),
            self.shutdown.clone(),
            Arc::clone(&self.transport),
        );

        let handler = Arc::clone(&self.handler);
        let handler_task = tokio::spawn(async move { handler.handle(ctx).await });

        // Runs as a plain future racing the handler task, not a detached
        // spawn: when the handler finishes `select!` drops this branch, and
        // if the surrounding dispatch task is itself aborted (drain timeout)
        // the whole thing - renewal loop included - stops with it.
        let renewal_loop = {
            let this = Arc::clone(&self);
            let job_id = job.job_id.clone();
            let worker_id = worker_id.clone();
            let renew_every = self.renewal_interval();
            async move {
                loop {
                    tokio::time::sleep(renew_every).await;
                    match this.renew_lease(&job_id, &worker_id).await {
                        Ok(()) => this.degraded.store(false, Ordering::SeqCst),
                        Err(_err) => {
                            this.degraded.store(true, Ordering::SeqCst);
                            #[cfg(feature = "tracing")]
                            tracing::warn!(job_id = %job_id, error = %_err, "lease renewal failed");
                        }
                    }
                }
            }
        };

        let outcome = tokio::select! {
            outcome = handler_task => outcome,
            _ = renewal_loop => unreachable!("renewal loop never returns"),
        };

        self.in_flight_jobs.lock().await.remove(&job.job_id);

        match outcome {
            Ok(Ok(result)) => match self.complete(&job.job_id, &worker_id, result).await {
                Ok(()) => self.events.emit(&WorkerEvent::job_completed(job.job_id.clone())),
                Err(err) => self.events.emit(&WorkerEvent::error(err.to_string())),
            },
            Ok(Err(handler_err)) => {
                let retry = handler_err.is_retryable();
                let message = handler_err.message().to_string();
                if let Err(err) = self.fail(&job.job_id, &worker_id, &message, retry).await {
                    self.events.emit(&WorkerEvent::error(err.to_string()));
                }
                self.events.emit(&WorkerEvent::job_failed(job.job_id.clone(), message));
            }
            Err(_join_err) => {
                let message = "handler panicked".to_string();
                let _ = self.fail(&job.job_id, &worker_id, &message, true).await;
                self.events.emit(&WorkerEvent::job_failed(job.job_id.clone(), message));
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.slot_freed.notify_one();
    }

    async fn renew_lease(&self, job_id: &str, worker_id: &str) -> Result<(), SpooledError> {
        let body = serde_json::json!({
            "workerId": worker_id,
            "leaseDurationSecs": self.lease_duration().as_secs(),
        });
        self.transport
            .post(&format!("jobs/{job_id}/heartbeat"), body)
            .await
            .map(|_| ())
    }

    async fn complete(
        &self,
        job_id: &str,
        worker_id: &str,
        result: serde_json::Value,
    ) -> Result<(), SpooledError> {
        let body = serde_json::json!({ "workerId": worker_id, "result": result });
        self.transport
            .post(&format!("jobs/{job_id}/complete"), body)
            .await
            .map(|_| ())
    }

    async fn fail(
        &self,
        job_id: &str,
        worker_id: &str,
        error: &str,
        retry: bool,
    ) -> Result<(), SpooledError> {
        let body = serde_json::json!({ "workerId": worker_id, "error": error, "retry": retry });
        self.transport
            .post(&format!("jobs/{job_id}/fail"), body)
            .await
            .map(|_| ())
    }

    async fn drain(&self, dispatch_tasks: Arc<AsyncMutex<JoinSet<()>>>) {
        let sleep = tokio::time::sleep(self.config.shutdown_timeout);
        tokio::pin!(sleep);
        loop {
            let mut guard = dispatch_tasks.lock().await;
            if guard.is_empty() {
                return;
            }
            tokio::select! {
                _ = guard.join_next() => {}
                _ = &mut sleep => {
                    let survivors: Vec<(String, String)> = self
                        .in_flight_jobs
                        .lock()
                        .await
                        .iter()
                        .map(|(job_id, worker_id)| (job_id.clone(), worker_id.clone()))
                        .collect();
                    for (job_id, worker_id) in survivors {
                        let _ = self.fail(&job_id, &worker_id, "worker shutdown", true).await;
                    }
                    guard.abort_all();
                    while guard.join_next().await.is_some() {}
                    return;
                }
            }
        }
    }
}
