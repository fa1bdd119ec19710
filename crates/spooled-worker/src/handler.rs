use crate::context::JobContext;
use async_trait::async_trait;

/// User-supplied job processing logic, registered with
/// [`crate::WorkerRuntime::new`].
///
/// The return value becomes the job result; returning
/// [`HandlerError::NonRetryable`] suppresses server-side retry. Handler
/// panics are caught at dispatch and translated into a retryable failure, so
/// ordinary `?`/`panic!` use in handler bodies is safe.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, ctx: JobContext) -> Result<serde_json::Value, HandlerError>;
}

/// The outcome of a failed handler invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerError {
    /// Ordinary failure; the server may schedule a retry.
    #[error("{0}")]
    Failed(String),
    /// Distinguished marker suppressing server-side retry for this job.
    #[error("{0}")]
    NonRetryable(String),
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, HandlerError::NonRetryable(_))
    }

    pub fn message(&self) -> &str {
        match self {
            HandlerError::Failed(m) | HandlerError::NonRetryable(m) => m,
        }
    }
}

type BoxedHandlerFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<serde_json::Value, HandlerError>> + Send>>;

/// Adapts a plain closure into a [`JobHandler`], mirroring `tower::service_fn`.
pub struct HandlerFn<F>(F);

pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(JobContext) -> BoxedHandlerFuture + Send + Sync,
{
    HandlerFn(f)
}

#[async_trait]
impl<F> JobHandler for HandlerFn<F>
where
    F: Fn(JobContext) -> BoxedHandlerFuture + Send + Sync,
{
    async fn handle(&self, ctx: JobContext) -> Result<serde_json::Value, HandlerError> {
        (self.0)(ctx).await
    }
}
