//! Realtime subscription core for the Spooled SDK.
//!
//! A [`RealtimeClient`] opens a streaming channel to the server - a
//! line-delimited push connection by default, or a persistent duplex
//! WebSocket when the `ws` feature is enabled - parses framed events, and
//! dispatches each to every matching [`Subscription`]. Connection loss
//! triggers reconnect with exponential backoff; a server-supplied `retry`
//! hint overrides the configured base delay.
//!
//! # Example
//!
//! ```rust,no_run
//! use spooled_realtime::{RealtimeClient, RealtimeConfig, Subscription};
//! use spooled_transport::CredentialSet;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = RealtimeConfig::new(
//!     "https://api.spooled.dev/api/v1/events",
//!     CredentialSet {
//!         api_key: Some("sk_live_...".to_string()),
//!         ..Default::default()
//!     },
//! );
//! let client = Arc::new(RealtimeClient::new(config));
//! client.on(Subscription::Job("job-1".to_string()), |event| {
//!     println!("job-1 event: {:?}", event.data);
//! });
//! client.run().await;
//! # }
//! ```

mod client;
mod config;
#[cfg(feature = "ws")]
mod duplex;
mod events;
mod policy;
mod push;
mod subscription;

pub use client::RealtimeClient;
pub use config::RealtimeConfig;
pub use events::RealtimeEvent;
pub use subscription::{DecodedEvent, Subscription};

#[cfg(test)]
mod tests {
    use super::*;
    use spooled_core::events::FnListener;
    use spooled_transport::CredentialSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn dispatches_decoded_events_to_matching_subscriptions() {
        let server = MockServer::start().await;

        let body = "event: job.completed\ndata: {\"jobId\": \"job-1\"}\n\n";
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/event-stream")
                    .append_header("content-type", "text/event-stream"),
            )
            .mount(&server)
            .await;

        let config = RealtimeConfig::new(
            format!("{}/events", server.uri()),
            CredentialSet {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
        );
        let client = Arc::new(RealtimeClient::new(config));

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        client.on(Subscription::Job("job-1".to_string()), move |event| {
            assert_eq!(event.event_type, "job.completed");
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let connected = Arc::new(AtomicUsize::new(0));
        let connected_clone = Arc::clone(&connected);
        client.on_lifecycle(FnListener::new(move |event: &RealtimeEvent| {
            if matches!(event, RealtimeEvent::Connected { .. }) {
                connected_clone.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let run_handle = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.run().await })
        };

        for _ in 0..50 {
            if hits.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(connected.load(Ordering::SeqCst), 1);

        client.stop();
        run_handle.await.unwrap();
    }

    #[tokio::test]
    async fn connect_failure_emits_error_and_reconnects() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("event: message\ndata: {}\n\n", "text/event-stream"),
            )
            .with_priority(2)
            .mount(&server)
            .await;

        let mut config = RealtimeConfig::new(
            format!("{}/events", server.uri()),
            CredentialSet::default(),
        );
        config.base_delay = Duration::from_millis(10);
        config.max_delay = Duration::from_millis(50);
        let client = Arc::new(RealtimeClient::new(config));

        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let connected = Arc::new(AtomicUsize::new(0));
        let connected_clone = Arc::clone(&connected);
        client.on_lifecycle(FnListener::new(move |event: &RealtimeEvent| match event {
            RealtimeEvent::Error { .. } => {
                errors_clone.fetch_add(1, Ordering::SeqCst);
            }
            RealtimeEvent::Connected { .. } => {
                connected_clone.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }));

        let run_handle = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.run().await })
        };

        for _ in 0..100 {
            if connected.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(connected.load(Ordering::SeqCst), 1);

        client.stop();
        run_handle.await.unwrap();
    }
}
