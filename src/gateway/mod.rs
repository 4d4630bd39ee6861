// src/gateway/mod.rs
//! HTTP/JSON front end translating requests into log-cache RPC calls.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::rpc::LogCacheClient;

mod error;
pub mod params;
pub mod promql;
mod routes;
mod server;

pub use error::GatewayError;
pub use routes::{build_router, Endpoint};
pub use server::{Gateway, RunningGateway};

/// Shared, read-only state of every request handler.
pub struct GatewayState {
    pub client: Arc<dyn LogCacheClient>,
    pub version: String,
}

const ENCODE_FAILURE_BODY: &str =
    "{\"status\":\"error\",\"errorType\":\"internal\",\"error\":\"failed to encode response\"}\n";

/// Serializes `body` as JSON followed by a single `\n`.
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(mut bytes) => {
            bytes.push(b'\n');
            (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to encode response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                ENCODE_FAILURE_BODY,
            )
                .into_response()
        }
    }
}
