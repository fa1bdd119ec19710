use crate::config::RealtimeConfig;
use eventsource_stream::{Event as SseEvent, Eventsource};
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde_json::Value;
use spooled_core::SpooledError;
use std::pin::Pin;
use std::time::Duration;

/// A single decoded realtime event, independent of which transport produced it.
pub struct Frame {
    pub event_type: String,
    pub data: Value,
    pub id: Option<String>,
    pub retry: Option<Duration>,
}

/// The line-delimited one-way push transport: a long-lived GET whose
/// response body is framed SSE-style events.
pub struct PushTransport {
    client: Client,
    config: RealtimeConfig,
}

impl PushTransport {
    pub fn new(config: RealtimeConfig) -> Result<Self, SpooledError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SpooledError::Network {
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    pub async fn connect(
        &self,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Frame, SpooledError>> + Send>>, SpooledError> {
        let mut url = url::Url::parse(&self.config.push_url).map_err(|e| SpooledError::Generic {
            status_code: 0,
            message: format!("invalid realtime URL: {e}"),
            request_id: None,
        })?;

        let token = self
            .config
            .credentials
            .access_token
            .clone()
            .or_else(|| self.config.credentials.api_key.clone());

        let mut builder = self.client.get(url.clone());
        if self.config.auth_via_query {
            if let Some(token) = &token {
                let key = if self.config.credentials.access_token.is_some() {
                    "token"
                } else {
                    "api_key"
                };
                url.query_pairs_mut().append_pair(key, token);
                builder = self.client.get(url);
            }
        } else if let Some(token) = &token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = builder.send().await.map_err(|e| SpooledError::Network {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(SpooledError::Generic {
                status_code: response.status().as_u16(),
                message: format!("realtime push connect failed: {}", response.status()),
                request_id: None,
            });
        }

        let stream = response.bytes_stream().eventsource().filter_map(|item| async move {
            match item {
                Ok(sse) => decode(sse).map(Ok),
                Err(e) => Some(Err(SpooledError::Network {
                    message: e.to_string(),
                })),
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Decodes a single SSE frame per the framing grammar: default type
/// `message`, empty data discarded, JSON-decode with string fallback.
fn decode(sse: SseEvent) -> Option<Frame> {
    if sse.data.is_empty() {
        return None;
    }
    let data = serde_json::from_str::<Value>(&sse.data)
        .unwrap_or_else(|_| Value::String(sse.data.clone()));
    let event_type = if sse.event.is_empty() {
        "message".to_string()
    } else {
        sse.event
    };
    Some(Frame {
        event_type,
        data,
        id: if sse.id.is_empty() { None } else { Some(sse.id) },
        retry: sse.retry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_is_discarded() {
        let sse = SseEvent {
            event: "message".to_string(),
            data: String::new(),
            id: String::new(),
            retry: None,
        };
        assert!(decode(sse).is_none());
    }

    #[test]
    fn missing_event_type_defaults_to_message() {
        let sse = SseEvent {
            event: String::new(),
            data: "{\"jobId\": \"job-1\"}".to_string(),
            id: String::new(),
            retry: None,
        };
        let frame = decode(sse).unwrap();
        assert_eq!(frame.event_type, "message");
        assert_eq!(frame.data["jobId"], "job-1");
    }

    #[test]
    fn unparseable_data_is_kept_as_a_string() {
        let sse = SseEvent {
            event: "ping".to_string(),
            data: "not json".to_string(),
            id: String::new(),
            retry: None,
        };
        let frame = decode(sse).unwrap();
        assert_eq!(frame.data, Value::String("not json".to_string()));
    }
}
