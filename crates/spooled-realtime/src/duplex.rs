use crate::config::RealtimeConfig;
use crate::push::Frame;
use futures::stream::{Stream, StreamExt};
use serde_json::Value;
use spooled_core::SpooledError;
use std::pin::Pin;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;

/// The persistent duplex transport: a single WebSocket connection carrying
/// JSON-framed events (`{"event": ..., "data": ..., "id": ...}` per message).
pub struct DuplexTransport {
    config: RealtimeConfig,
}

impl DuplexTransport {
    pub fn new(config: RealtimeConfig) -> Self {
        Self { config }
    }

    pub async fn connect(
        &self,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Frame, SpooledError>> + Send>>, SpooledError> {
        let mut url =
            url::Url::parse(&self.config.resolved_ws_url()).map_err(|e| SpooledError::Generic {
                status_code: 0,
                message: format!("invalid websocket URL: {e}"),
                request_id: None,
            })?;

        let token = self
            .config
            .credentials
            .access_token
            .clone()
            .or_else(|| self.config.credentials.api_key.clone());

        if self.config.auth_via_query {
            if let Some(token) = &token {
                let key = if self.config.credentials.access_token.is_some() {
                    "token"
                } else {
                    "api_key"
                };
                url.query_pairs_mut().append_pair(key, token);
            }
        }

        let mut request =
            url.as_str()
                .into_client_request()
                .map_err(|e| SpooledError::Generic {
                    status_code: 0,
                    message: format!("invalid websocket request: {e}"),
                    request_id: None,
                })?;

        if !self.config.auth_via_query {
            if let Some(token) = token {
                let value = http::HeaderValue::from_str(&format!("Bearer {token}")).map_err(
                    |e| SpooledError::Generic {
                        status_code: 0,
                        message: format!("invalid auth header: {e}"),
                        request_id: None,
                    },
                )?;
                request.headers_mut().insert(http::header::AUTHORIZATION, value);
            }
        }

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| SpooledError::Network {
                message: e.to_string(),
            })?;

        let stream = ws_stream.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => decode(&text).map(Ok),
                Ok(Message::Close(_)) | Ok(_) => None,
                Err(e) => Some(Err(SpooledError::Network {
                    message: e.to_string(),
                })),
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Decodes a single `{"event", "data", "id"}` websocket message, the duplex
/// transport's equivalent of the push transport's SSE framing.
fn decode(text: &str) -> Option<Frame> {
    let value: Value =
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    let event_type = value
        .get("event")
        .and_then(Value::as_str)
        .unwrap_or("message")
        .to_string();
    let data = value.get("data").cloned().unwrap_or(Value::Null);
    if data.is_null() {
        return None;
    }
    let id = value.get("id").and_then(Value::as_str).map(str::to_string);
    Some(Frame {
        event_type,
        data,
        id,
        retry: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_event_and_data_fields() {
        let frame = decode(r#"{"event": "job.completed", "data": {"jobId": "job-1"}, "id": "1"}"#)
            .unwrap();
        assert_eq!(frame.event_type, "job.completed");
        assert_eq!(frame.data["jobId"], "job-1");
        assert_eq!(frame.id.as_deref(), Some("1"));
    }

    #[test]
    fn missing_data_is_discarded() {
        assert!(decode(r#"{"event": "ping"}"#).is_none());
    }
}
