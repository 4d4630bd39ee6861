// src/rpc/mod.rs
//! Typed contract of the backing log-cache service.
//!
//! The transport (and its TLS setup) is supplied by the embedding process; the
//! gateway and the batched ingress client only depend on the traits below.

pub mod egress;
pub mod envelope;
pub mod ingress;
mod json;
pub mod promql;

pub use egress::{MetaInfo, MetaRequest, MetaResponse, ReadRequest, ReadResponse};
pub use envelope::{
    Envelope, EnvelopeBatch, EnvelopeMessage, EnvelopeType, Event, Gauge, GaugeValue, Log,
    LogType, Timer,
};
pub use ingress::{SendRequest, SendResponse};
pub use promql::{
    InstantQueryRequest, Point, QueryResult, RangeQueryRequest, Sample, Scalar, Series,
};

/// Status codes carried by a failed RPC call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcCode {
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    Unavailable,
    Internal,
}

/// Error returned by the backing service.
///
/// `Display` renders only the message so it can be surfaced to HTTP clients
/// exactly as the backend produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unknown, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unavailable, message)
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RpcError {}

/// Read side of the cache: envelope reads and per-source metadata.
#[async_trait::async_trait]
pub trait EgressClient: Send + Sync {
    async fn read(&self, req: ReadRequest) -> Result<ReadResponse, RpcError>;

    async fn meta(&self, req: MetaRequest) -> Result<MetaResponse, RpcError>;
}

/// PromQL evaluation offered by the cache.
#[async_trait::async_trait]
pub trait PromQlClient: Send + Sync {
    async fn instant_query(&self, req: InstantQueryRequest) -> Result<QueryResult, RpcError>;

    async fn range_query(&self, req: RangeQueryRequest) -> Result<QueryResult, RpcError>;
}

/// Write side of the cache.
#[async_trait::async_trait]
pub trait IngressClient: Send + Sync {
    async fn send(&self, req: SendRequest) -> Result<SendResponse, RpcError>;
}

/// Everything the HTTP gateway needs from the backend.
pub trait LogCacheClient: EgressClient + PromQlClient {}

impl<T: EgressClient + PromQlClient> LogCacheClient for T {}
