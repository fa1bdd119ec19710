//! Lazily-established gRPC transport, generated from `proto/spooled.proto`.

pub mod pb {
    tonic::include_proto!("spooled.v1");
}

use crate::auth::CredentialSet;
use crate::error::grpc_status_to_error;
use pb::queue_service_client::QueueServiceClient;
use pb::worker_service_client::WorkerServiceClient;
use spooled_core::SpooledError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};

/// Attaches `x-api-key` to every outgoing call, per the RPC auth surface:
/// access token beats API key beats no auth, same precedence as the HTTP
/// transport's `Authorization` header - just under a different header name.
#[derive(Clone)]
struct ApiKeyInterceptor {
    credentials: Arc<arc_swap::ArcSwap<CredentialSet>>,
}

impl tonic::service::Interceptor for ApiKeyInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let creds = self.credentials.load();
        let value = match (&creds.access_token, &creds.api_key) {
            (Some(token), _) if !token.is_empty() => Some(token.as_str()),
            (_, Some(key)) if !key.is_empty() => Some(key.as_str()),
            _ => None,
        };
        if let Some(value) = value {
            if let Ok(value) = tonic::metadata::MetadataValue::try_from(value) {
                request.metadata_mut().insert("x-api-key", value);
            }
        }
        Ok(request)
    }
}

type InterceptedChannel = InterceptedService<Channel, ApiKeyInterceptor>;

/// Converts between the SDK's `serde_json::Value` structured-value
/// representation and the `google.protobuf.Value` that crosses the RPC
/// boundary.
pub struct PayloadCodec;

impl PayloadCodec {
    pub fn to_proto(value: &serde_json::Value) -> prost_types::Value {
        json_to_proto(value)
    }

    pub fn from_proto(value: &prost_types::Value) -> serde_json::Value {
        proto_to_json(value)
    }
}

fn json_to_proto(value: &serde_json::Value) -> prost_types::Value {
    use prost_types::value::Kind;
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(*b),
        serde_json::Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Kind::StringValue(s.clone()),
        serde_json::Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_proto).collect(),
        }),
        serde_json::Value::Object(map) => Kind::StructValue(prost_types::Struct {
            fields: map.iter().map(|(k, v)| (k.clone(), json_to_proto(v))).collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json(value: &prost_types::Value) -> serde_json::Value {
    use prost_types::value::Kind;
    match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::NumberValue(n)) => serde_json::json!(n),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(proto_to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields.iter().map(|(k, v)| (k.clone(), proto_to_json(v))).collect(),
        ),
    }
}

/// The RPC backend: one lazily-connected channel shared by both generated
/// service clients.
pub struct RpcTransport {
    address: String,
    connect_timeout: Duration,
    channel: OnceCell<Channel>,
    credentials: Arc<arc_swap::ArcSwap<CredentialSet>>,
}

impl RpcTransport {
    pub fn new(address: impl Into<String>, connect_timeout: Duration, credentials: CredentialSet) -> Self {
        Self {
            address: address.into(),
            connect_timeout,
            channel: OnceCell::new(),
            credentials: Arc::new(arc_swap::ArcSwap::from_pointee(credentials)),
        }
    }

    fn interceptor(&self) -> ApiKeyInterceptor {
        ApiKeyInterceptor {
            credentials: Arc::clone(&self.credentials),
        }
    }

    async fn channel(&self) -> Result<Channel, SpooledError> {
        self.channel
            .get_or_try_init(|| async {
                let endpoint = Endpoint::from_shared(self.address.clone())
                    .map_err(|e| SpooledError::Generic {
                        status_code: 0,
                        message: format!("invalid RPC address: {e}"),
                        request_id: None,
                    })?
                    .connect_timeout(self.connect_timeout);

                endpoint.connect().await.map_err(|e| SpooledError::Network {
                    message: e.to_string(),
                })
            })
            .await
            .map(Channel::clone)
    }

    /// Polls until the channel is connected or `deadline` elapses.
    pub async fn wait_for_ready(&self, deadline: Duration) -> Result<(), SpooledError> {
        let started = Instant::now();
        loop {
            match self.channel().await {
                Ok(_) => return Ok(()),
                Err(err) if started.elapsed() >= deadline => return Err(err),
                Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    }

    /// Drops the cached channel. The next call re-establishes it lazily.
    pub fn close(&mut self) {
        self.channel = OnceCell::new();
    }

    pub async fn queue_client(&self) -> Result<QueueServiceClient<InterceptedChannel>, SpooledError> {
        let channel = self.channel().await?;
        Ok(QueueServiceClient::with_interceptor(channel, self.interceptor()))
    }

    pub async fn worker_client(&self) -> Result<WorkerServiceClient<InterceptedChannel>, SpooledError> {
        let channel = self.channel().await?;
        Ok(WorkerServiceClient::with_interceptor(channel, self.interceptor()))
    }
}

/// Converts a failed RPC call's [`tonic::Status`] to the unified taxonomy.
/// Exposed so callers composing their own client calls (as `spooled-worker`
/// does) can reuse the mapping without going through [`RpcTransport`].
pub fn map_status(status: tonic::Status) -> SpooledError {
    grpc_status_to_error(&status)
}
