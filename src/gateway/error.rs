use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use super::json_response;
use crate::rpc::RpcError;

/// Failure of a single HTTP request. Never outlives the request.
#[derive(Debug)]
pub enum GatewayError {
    /// Malformed or unsupported client input.
    BadRequest(String),
    NotFound(String),
    /// Known path, unsupported method. Every endpoint is read-only.
    MethodNotAllowed(String),
    /// The backing service rejected or failed the call.
    Rpc(RpcError),
    /// The backend reply could not be rendered as JSON.
    Encode(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Rpc(_) | GatewayError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `errorType` value in the Prometheus-style error body.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::BadRequest(_) | GatewayError::MethodNotAllowed(_) => "bad_data",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Rpc(_) | GatewayError::Encode(_) => "internal",
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::BadRequest(msg) => write!(f, "{}", msg),
            GatewayError::NotFound(msg) => write!(f, "{}", msg),
            GatewayError::MethodNotAllowed(msg) => write!(f, "{}", msg),
            GatewayError::Rpc(e) => write!(f, "{}", e),
            GatewayError::Encode(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<RpcError> for GatewayError {
    fn from(e: RpcError) -> Self {
        GatewayError::Rpc(e)
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    status: &'static str,
    #[serde(rename = "errorType")]
    error_type: &'static str,
    error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "rejected request");
        }

        let body = ErrorBody {
            status: "error",
            error_type: self.error_type(),
            error: self.to_string(),
        };
        let mut response = json_response(status, &body);
        if matches!(self, GatewayError::MethodNotAllowed(_)) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET,HEAD"));
        }
        response
    }
}
