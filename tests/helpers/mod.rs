#![allow(dead_code)] // Test helpers appear unused when compiled independently

use logcache_gateway::rpc::{
    Envelope, EnvelopeMessage, InstantQueryRequest, Log, MetaInfo, MetaRequest, MetaResponse,
    Point, QueryResult, RangeQueryRequest, ReadRequest, ReadResponse, Scalar, SendRequest,
    SendResponse, Series,
};
use logcache_gateway::{EgressClient, Gateway, IngressClient, PromQlClient, RpcError, RunningGateway};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const WAIT_ATTEMPTS: usize = 50;
const WAIT_DELAY: Duration = Duration::from_millis(100);

/// Records every request and answers with canned data.
#[derive(Default)]
pub struct SpyLogCache {
    read_requests: Mutex<Vec<ReadRequest>>,
    meta_requests: Mutex<Vec<MetaRequest>>,
    query_requests: Mutex<Vec<InstantQueryRequest>>,
    range_query_requests: Mutex<Vec<RangeQueryRequest>>,
    value: Mutex<f64>,
    query_error: Mutex<Option<String>>,
}

impl SpyLogCache {
    pub async fn set_value(&self, value: f64) {
        *self.value.lock().await = value;
    }

    pub async fn set_query_error(&self, message: &str) {
        *self.query_error.lock().await = Some(message.to_string());
    }

    pub async fn read_requests(&self) -> Vec<ReadRequest> {
        self.read_requests.lock().await.clone()
    }

    pub async fn meta_requests(&self) -> Vec<MetaRequest> {
        self.meta_requests.lock().await.clone()
    }

    pub async fn query_requests(&self) -> Vec<InstantQueryRequest> {
        self.query_requests.lock().await.clone()
    }

    pub async fn range_query_requests(&self) -> Vec<RangeQueryRequest> {
        self.range_query_requests.lock().await.clone()
    }

    async fn query_error(&self) -> Option<RpcError> {
        self.query_error
            .lock()
            .await
            .as_ref()
            .map(|message| RpcError::unknown(message.clone()))
    }
}

#[async_trait::async_trait]
impl EgressClient for SpyLogCache {
    async fn read(&self, req: ReadRequest) -> Result<ReadResponse, RpcError> {
        let source_id = req.source_id.clone();
        self.read_requests.lock().await.push(req);

        Ok(ReadResponse {
            envelopes: vec![Envelope {
                timestamp: 100,
                source_id,
                message: Some(EnvelopeMessage::Log(Log {
                    payload: b"log line".to_vec(),
                    ..Default::default()
                })),
                ..Default::default()
            }]
            .into(),
        })
    }

    async fn meta(&self, req: MetaRequest) -> Result<MetaResponse, RpcError> {
        self.meta_requests.lock().await.push(req);

        let mut meta = BTreeMap::new();
        meta.insert(
            "source-1".to_string(),
            MetaInfo {
                count: 3,
                expired: 1,
                oldest_timestamp: 10,
                newest_timestamp: 20,
            },
        );
        Ok(MetaResponse { meta })
    }
}

#[async_trait::async_trait]
impl PromQlClient for SpyLogCache {
    async fn instant_query(&self, req: InstantQueryRequest) -> Result<QueryResult, RpcError> {
        self.query_requests.lock().await.push(req);
        if let Some(err) = self.query_error().await {
            return Err(err);
        }

        Ok(QueryResult::Scalar(Scalar {
            time: "99".to_string(),
            value: *self.value.lock().await,
        }))
    }

    async fn range_query(&self, req: RangeQueryRequest) -> Result<QueryResult, RpcError> {
        self.range_query_requests.lock().await.push(req);
        if let Some(err) = self.query_error().await {
            return Err(err);
        }

        let mut metric = BTreeMap::new();
        metric.insert("source_id".to_string(), "some-id".to_string());
        Ok(QueryResult::Matrix(vec![Series {
            metric,
            points: vec![
                Point {
                    time: "1234.000".to_string(),
                    value: *self.value.lock().await,
                },
                Point {
                    time: "1264.000".to_string(),
                    value: 2.5,
                },
            ],
        }]))
    }
}

/// Ingress backend that records every batch it receives.
#[derive(Default)]
pub struct SpyIngress {
    requests: Mutex<Vec<SendRequest>>,
}

impl SpyIngress {
    pub async fn requests(&self) -> Vec<SendRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn envelope_count(&self) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.envelopes.batch.len())
            .sum()
    }
}

#[async_trait::async_trait]
impl IngressClient for SpyIngress {
    async fn send(&self, req: SendRequest) -> Result<SendResponse, RpcError> {
        self.requests.lock().await.push(req);
        Ok(SendResponse::default())
    }
}

/// Best-effort check for whether binding to loopback is permitted in the current sandbox.
pub async fn can_bind_loopback() -> bool {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(_) => true, // treat other errors as non-fatal for skipping
    }
}

/// Start a gateway on an ephemeral loopback port.
pub async fn start_gateway(spy: Arc<SpyLogCache>, version: &str) -> (RunningGateway, String) {
    let gateway = Gateway::new(spy, version);
    let running = gateway
        .start("127.0.0.1:0")
        .await
        .expect("failed to start gateway");
    let base_url = format!("http://{}", running.addr());
    (running, base_url)
}

/// Poll `f` until it yields a value or the attempts run out.
pub async fn poll_until<T, F, Fut>(mut f: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for _ in 0..WAIT_ATTEMPTS {
        if let Some(result) = f().await {
            return Some(result);
        }
        tokio::time::sleep(WAIT_DELAY).await;
    }
    None
}
