//! Client-side runtime for the Spooled hosted job-queue service.
//!
//! This crate wires together the three cores that do the hard engineering:
//!
//! - **Transport Core** ([`spooled_transport`]) - a resilient request
//!   pipeline combining retry, a circuit breaker, pluggable auth, and
//!   bidirectional field-name case conversion, fronting a JSON/HTTP backend
//!   (and, with the `rpc` feature, a binary/RPC one).
//! - **Worker Runtime Core** ([`spooled_worker`], behind the `worker`
//!   feature) - a long-lived job processor: claim, bounded concurrent
//!   dispatch, lease renewal, heartbeat, graceful drain.
//! - **Realtime Subscription Core** ([`spooled_realtime`], behind the
//!   `realtime` feature, with `ws` for the duplex transport) - a streaming
//!   event client with automatic reconnect and topic-routed dispatch.
//!
//! The catalogue of resource methods (jobs, queues, schedules, workflows,
//! webhooks, API keys, org admin, billing) is out of scope for this crate;
//! it is built on top of [`SpooledClient::transport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use spooled::{SpooledClient, SpooledConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = SpooledConfig::new("https://api.spooled.dev");
//! config.credentials.api_key = Some("sk_live_...".to_string());
//! spooled::config::load_env_overrides(&mut config);
//!
//! let client = SpooledClient::new(config)?;
//! let result = client.transport().get("jobs/job-1").await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod config;

mod client;

pub use client::SpooledClient;
pub use config::SpooledConfig;

pub use spooled_core as core;
pub use spooled_transport as transport;

#[cfg(feature = "worker")]
pub use spooled_worker as worker;

#[cfg(feature = "realtime")]
pub use spooled_realtime as realtime;
