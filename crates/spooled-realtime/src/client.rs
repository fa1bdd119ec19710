use crate::config::RealtimeConfig;
#[cfg(feature = "ws")]
use crate::duplex::DuplexTransport;
use crate::events::RealtimeEvent;
use crate::policy::ReconnectPolicy;
use crate::push::Frame;
#[cfg(not(feature = "ws"))]
use crate::push::PushTransport;
use crate::subscription::{DecodedEvent, Subscription, Subscriptions};
use futures::stream::{Stream, StreamExt};
use spooled_core::events::{EventListener, EventListeners};
use spooled_core::SpooledError;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A realtime subscription connection: a single-threaded cooperative read
/// loop that reconnects with backoff and dispatches decoded events to
/// matching subscriptions.
pub struct RealtimeClient {
    config: RealtimeConfig,
    policy: ReconnectPolicy,
    subscriptions: Subscriptions,
    lifecycle: Mutex<EventListeners<RealtimeEvent>>,
    running: Arc<AtomicBool>,
}

impl RealtimeClient {
    pub fn new(config: RealtimeConfig) -> Self {
        let policy = ReconnectPolicy::new(config.base_delay, config.max_delay);
        Self {
            config,
            policy,
            subscriptions: Subscriptions::new(),
            lifecycle: Mutex::new(EventListeners::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Registers a callback for a topic. Callback panics are caught and
    /// logged, never propagated to the read loop.
    pub fn on<F>(&self, subscription: Subscription, callback: F)
    where
        F: Fn(&DecodedEvent) + Send + Sync + 'static,
    {
        self.subscriptions.on(subscription, callback);
    }

    /// Registers a listener for connection lifecycle events
    /// (`connected`, `reconnecting`, `error`, `stopped`).
    pub fn on_lifecycle<L>(&self, listener: L)
    where
        L: EventListener<RealtimeEvent> + 'static,
    {
        self.lifecycle.lock().unwrap().add(listener);
    }

    /// Stops the read loop and closes the connection. Safe to call from
    /// another task while `run()` is in progress.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs the read loop until `stop()` is observed. Connects, reads
    /// frames, dispatches to matching subscriptions, and reconnects with
    /// backoff on connection loss.
    pub async fn run(self: Arc<Self>) {
        self.running.store(true, Ordering::SeqCst);

        'reconnect: while self.running.load(Ordering::SeqCst) {
            let mut stream = match self.connect().await {
                Ok(stream) => {
                    self.policy.reset();
                    self.emit_lifecycle(RealtimeEvent::connected());
                    stream
                }
                Err(err) => {
                    self.emit_lifecycle(RealtimeEvent::error(err.to_string()));
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    self.backoff().await;
                    continue 'reconnect;
                }
            };

            while self.running.load(Ordering::SeqCst) {
                match stream.next().await {
                    Some(Ok(frame)) => self.handle_frame(frame),
                    Some(Err(err)) => {
                        self.emit_lifecycle(RealtimeEvent::error(err.to_string()));
                        break;
                    }
                    None => break,
                }
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            self.backoff().await;
        }

        self.emit_lifecycle(RealtimeEvent::stopped());
    }

    async fn backoff(&self) {
        let (delay, attempt) = self.policy.next_delay();
        self.emit_lifecycle(RealtimeEvent::reconnecting(delay, attempt));
        tokio::time::sleep(delay).await;
    }

    fn handle_frame(&self, frame: Frame) {
        if let Some(retry) = frame.retry {
            self.policy.set_base_delay(retry);
        }
        let event = DecodedEvent {
            event_type: frame.event_type,
            data: frame.data,
            id: frame.id,
        };
        self.subscriptions.dispatch(&event);
    }

    fn emit_lifecycle(&self, event: RealtimeEvent) {
        self.lifecycle.lock().unwrap().emit(&event);
    }

    #[cfg(feature = "ws")]
    async fn connect(
        &self,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Frame, SpooledError>> + Send>>, SpooledError> {
        DuplexTransport::new(self.config.clone()).connect().await
    }

    #[cfg(not(feature = "ws"))]
    async fn connect(
        &self,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Frame, SpooledError>> + Send>>, SpooledError> {
        PushTransport::new(self.config.clone())?.connect().await
    }
}
