//! Worker runtime core for the Spooled SDK.
//!
//! A [`WorkerRuntime`] claims jobs from a single queue under a bounded
//! concurrency, dispatches each to a [`JobHandler`], renews its lease while
//! it runs, and sends an independent worker-level heartbeat - all as
//! concurrent `tokio` tasks coordinated through a `CancellationToken`.
//!
//! # Example
//!
//! ```rust,no_run
//! use spooled_worker::{JobContext, JobHandler, HandlerError, WorkerConfig, WorkerRuntime};
//! use spooled_transport::{HttpTransport, TransportConfig, CredentialSet};
//! use std::sync::Arc;
//!
//! struct SendEmail;
//!
//! #[async_trait::async_trait]
//! impl JobHandler for SendEmail {
//!     async fn handle(&self, ctx: JobContext) -> Result<serde_json::Value, HandlerError> {
//!         Ok(serde_json::json!({ "sent": true, "jobId": ctx.job_id }))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TransportConfig::new("https://api.spooled.dev", CredentialSet {
//!     api_key: Some("sk_live_...".to_string()),
//!     ..Default::default()
//! });
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let runtime = Arc::new(WorkerRuntime::new(
//!     WorkerConfig::new("emails"),
//!     transport,
//!     SendEmail,
//! ));
//! runtime.start().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod events;
mod handler;
mod runtime;

pub use config::WorkerConfig;
pub use context::JobContext;
pub use events::WorkerEvent;
pub use handler::{handler_fn, HandlerError, HandlerFn, JobHandler};
pub use runtime::WorkerRuntime;
