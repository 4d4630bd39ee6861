// src/lib.rs
//! Edge process of a log and metric cache.
//!
//! - [`gateway`] translates HTTP/JSON requests into typed RPC calls and shapes
//!   PromQL results like the Prometheus HTTP API.
//! - [`ingress`] accepts envelopes without ever blocking the producer, batches
//!   them and forwards each batch to the backing service.

pub mod config;
pub mod gateway;
pub mod ingress;
pub mod metrics;
pub mod rpc;
pub mod telemetry;

pub use config::{load_config_from_path, GatewayConfig, IngressConfig, LogFormat};
pub use gateway::{build_router, Endpoint, Gateway, GatewayError, RunningGateway};
pub use ingress::{BatchedIngressClient, DROPPED_COUNTER};
pub use metrics::{Counter, InMemoryMetrics, Metrics};
pub use rpc::{EgressClient, IngressClient, LogCacheClient, PromQlClient, RpcError};
pub use telemetry::{init_tracing, init_tracing_with};

// Re-export tracing for use by embedders
pub use tracing;
