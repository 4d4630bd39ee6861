use axum::{
    extract::{RawQuery, State},
    http::{Method, StatusCode, Uri},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;
use tracing::{debug, Span};

use super::params::{self, QueryParams};
use super::promql::encode_query_result;
use super::{json_response, GatewayError, GatewayState};
use crate::rpc::MetaRequest;

/// Every endpoint the gateway serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Read,
    Meta,
    InstantQuery,
    RangeQuery,
    Info,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Read,
        Endpoint::Meta,
        Endpoint::InstantQuery,
        Endpoint::RangeQuery,
        Endpoint::Info,
    ];

    /// Route pattern. The read pattern captures the rest of the path so that
    /// source ids containing `/` reach the handler in one piece.
    pub fn pattern(&self) -> &'static str {
        match self {
            Endpoint::Read => "/api/v1/read/*source_id",
            Endpoint::Meta => "/api/v1/meta",
            Endpoint::InstantQuery => "/api/v1/query",
            Endpoint::RangeQuery => "/api/v1/query_range",
            Endpoint::Info => "/api/v1/info",
        }
    }

    fn handler(&self) -> MethodRouter<Arc<GatewayState>> {
        let router = match self {
            Endpoint::Read => get(handle_read),
            Endpoint::Meta => get(handle_meta),
            Endpoint::InstantQuery => get(handle_instant_query),
            Endpoint::RangeQuery => get(handle_range_query),
            Endpoint::Info => get(handle_info),
        };
        router.fallback(handle_method_not_allowed)
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Endpoint::ALL
        .iter()
        .fold(Router::new(), |router, endpoint| {
            router.route(endpoint.pattern(), endpoint.handler())
        })
        .fallback(handle_not_found)
        .with_state(state)
}

fn query_params(query: Option<String>) -> Result<QueryParams, GatewayError> {
    QueryParams::parse(query.as_deref().unwrap_or(""))
}

#[tracing::instrument(
    name = "read",
    skip_all,
    fields(source_id = tracing::field::Empty)
)]
async fn handle_read(
    State(state): State<Arc<GatewayState>>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> Result<Response, GatewayError> {
    let source_id = params::source_id_from_path(uri.path())?;
    Span::current().record("source_id", source_id.as_str());

    let req = params::read_request(source_id, &query_params(query)?)?;
    let resp = state.client.read(req).await?;

    debug!(envelopes = resp.envelopes.batch.len(), "read complete");
    Ok(json_response(StatusCode::OK, &resp))
}

#[tracing::instrument(name = "meta", skip_all)]
async fn handle_meta(State(state): State<Arc<GatewayState>>) -> Result<Response, GatewayError> {
    let resp = state
        .client
        .meta(MetaRequest { local_only: false })
        .await?;

    debug!(sources = resp.meta.len(), "meta complete");
    Ok(json_response(StatusCode::OK, &resp))
}

#[tracing::instrument(name = "instant_query", skip_all)]
async fn handle_instant_query(
    State(state): State<Arc<GatewayState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, GatewayError> {
    let req = params::instant_query_request(&query_params(query)?);
    debug!(query = %req.query, time = %req.time, "instant query");

    let result = state.client.instant_query(req).await?;
    Ok(json_response(StatusCode::OK, &encode_query_result(result)?))
}

#[tracing::instrument(name = "range_query", skip_all)]
async fn handle_range_query(
    State(state): State<Arc<GatewayState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, GatewayError> {
    let req = params::range_query_request(&query_params(query)?);
    debug!(
        query = %req.query,
        start = %req.start,
        end = %req.end,
        step = %req.step,
        "range query"
    );

    let result = state.client.range_query(req).await?;
    Ok(json_response(StatusCode::OK, &encode_query_result(result)?))
}

#[derive(serde::Serialize)]
struct InfoResponse<'a> {
    version: &'a str,
}

async fn handle_info(State(state): State<Arc<GatewayState>>) -> Response {
    json_response(
        StatusCode::OK,
        &InfoResponse {
            version: &state.version,
        },
    )
}

async fn handle_not_found(uri: Uri) -> GatewayError {
    GatewayError::NotFound(format!("no endpoint for {}", uri.path()))
}

async fn handle_method_not_allowed(method: Method, uri: Uri) -> GatewayError {
    GatewayError::MethodNotAllowed(format!("{} is not supported on {}", method, uri.path()))
}
