use serde_json::Value;
use std::sync::{Arc, Mutex};

/// A single decoded event off the wire: JSON-decoded `data`, with fallback
/// to the raw string when decoding fails.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    pub event_type: String,
    pub data: Value,
    pub id: Option<String>,
}

/// A topic a caller can register interest in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Fires when `event.type == type`.
    Type(String),
    /// Fires for every event.
    Wildcard,
    /// Fires when the decoded data references this job id.
    Job(String),
    /// Fires when the decoded data references this queue name.
    Queue(String),
}

impl Subscription {
    fn matches(&self, event: &DecodedEvent) -> bool {
        match self {
            Subscription::Wildcard => true,
            Subscription::Type(t) => event.event_type == *t,
            Subscription::Job(id) => references(&event.data, &["jobId", "id"], id),
            Subscription::Queue(name) => {
                references(&event.data, &["queueName", "queue", "queueId"], name)
            }
        }
    }
}

fn references(data: &Value, keys: &[&str], value: &str) -> bool {
    let Some(obj) = data.as_object() else {
        return false;
    };
    keys.iter()
        .any(|key| obj.get(*key).and_then(Value::as_str) == Some(value))
}

type Callback = Arc<dyn Fn(&DecodedEvent) + Send + Sync>;

/// The registry of subscriptions for a single [`crate::RealtimeClient`]
/// connection. Every matching subscription is invoked for each decoded
/// event; a panicking callback is caught so the remaining callbacks still
/// run.
#[derive(Default)]
pub struct Subscriptions {
    entries: Mutex<Vec<(Subscription, Callback)>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, subscription: Subscription, callback: F)
    where
        F: Fn(&DecodedEvent) + Send + Sync + 'static,
    {
        self.entries
            .lock()
            .unwrap()
            .push((subscription, Arc::new(callback)));
    }

    pub(crate) fn dispatch(&self, event: &DecodedEvent) {
        let entries = self.entries.lock().unwrap();
        for (subscription, callback) in entries.iter() {
            if !subscription.matches(event) {
                continue;
            }
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(event)));
            if let Err(_panic_payload) = result {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    event_type = %event.event_type,
                    "realtime subscription callback panicked"
                );
                #[cfg(feature = "metrics")]
                metrics::counter!(
                    "spooled_realtime_callback_panics_total",
                    "event_type" => event.event_type.clone()
                )
                .increment(1);
            }
        }
    }
}
