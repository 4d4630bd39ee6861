use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::envelope::{EnvelopeBatch, EnvelopeType};
use super::json::int_string;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Decoded source identifier; may contain `/`.
    pub source_id: String,
    /// Inclusive lower bound, nanoseconds since the Unix epoch.
    #[serde(with = "int_string")]
    pub start_time: i64,
    /// Exclusive upper bound, nanoseconds since the Unix epoch.
    #[serde(with = "int_string")]
    pub end_time: i64,
    #[serde(with = "int_string")]
    pub limit: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envelope_types: Vec<EnvelopeType>,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_filter: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResponse {
    pub envelopes: EnvelopeBatch,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaRequest {
    pub local_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(with = "int_string", default)]
    pub count: i64,
    #[serde(with = "int_string", default)]
    pub expired: i64,
    #[serde(with = "int_string", default)]
    pub oldest_timestamp: i64,
    #[serde(with = "int_string", default)]
    pub newest_timestamp: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaResponse {
    /// Keyed by source id.
    #[serde(default)]
    pub meta: BTreeMap<String, MetaInfo>,
}
