//! Request parameter extraction for the gateway endpoints.

use std::borrow::Cow;

use super::GatewayError;
use crate::rpc::{EnvelopeType, InstantQueryRequest, RangeQueryRequest, ReadRequest};

/// Prefix of the read endpoint; everything after it is the source id.
pub const READ_PREFIX: &str = "/api/v1/read/";

/// Decoded query string. Keeps every occurrence of a key, in order.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Result<Self, GatewayError> {
        let mut pairs = Vec::new();

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let mut parts = pair.splitn(2, '=');
            let key = decode_form_component(parts.next().unwrap_or(""))?;
            let value = decode_form_component(parts.next().unwrap_or(""))?;
            pairs.push((key, value));
        }

        Ok(Self { pairs })
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Base-10 integer parameter; absent or empty yields `0`.
    pub fn int64(&self, key: &str) -> Result<i64, GatewayError> {
        match self.get(key) {
            None | Some("") => Ok(0),
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                GatewayError::BadRequest(format!("invalid {}: {:?} is not an integer", key, raw))
            }),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, GatewayError> {
        match self.get(key) {
            None | Some("") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(raw) => Err(GatewayError::BadRequest(format!(
                "invalid {}: {:?} is not a boolean",
                key, raw
            ))),
        }
    }

    /// Verbatim string parameter; absent yields an empty string.
    pub fn string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }
}

/// Query-string component: `+` is a space, then percent-decoding.
fn decode_form_component(raw: &str) -> Result<String, GatewayError> {
    let spaced: Cow<str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| GatewayError::BadRequest(format!("invalid URL encoding in {:?}", raw)))
}

/// Extracts the source id from a raw (still percent-encoded) request path.
///
/// The source id is everything after the read prefix, so an encoded `%2F` and
/// a literal `/` decode to the same identifier.
pub fn source_id_from_path(path: &str) -> Result<String, GatewayError> {
    let raw = path
        .strip_prefix(READ_PREFIX)
        .ok_or_else(|| GatewayError::BadRequest(format!("malformed read path {:?}", path)))?;

    let source_id = urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| GatewayError::BadRequest(format!("invalid URL encoding in {:?}", raw)))?;

    if source_id.is_empty() {
        return Err(GatewayError::BadRequest("missing source id".to_string()));
    }
    Ok(source_id)
}

pub fn read_request(source_id: String, params: &QueryParams) -> Result<ReadRequest, GatewayError> {
    let envelope_types = params
        .get_all("envelope_types")
        .map(|name| {
            EnvelopeType::from_name(name).ok_or_else(|| {
                GatewayError::BadRequest(format!("invalid envelope_types: {:?}", name))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReadRequest {
        source_id,
        start_time: params.int64("start_time")?,
        end_time: params.int64("end_time")?,
        limit: params.int64("limit")?,
        envelope_types,
        descending: params.bool("descending")?,
        name_filter: params.string("name_filter"),
    })
}

pub fn instant_query_request(params: &QueryParams) -> InstantQueryRequest {
    InstantQueryRequest {
        query: params.string("query"),
        time: params.string("time"),
    }
}

pub fn range_query_request(params: &QueryParams) -> RangeQueryRequest {
    RangeQueryRequest {
        query: params.string("query"),
        start: params.string("start"),
        end: params.string("end"),
        step: params.string("step"),
    }
}
