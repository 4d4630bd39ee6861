//! PromQL request and result messages. Query strings and timestamps are
//! carried as strings and never reparsed by the gateway.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstantQueryRequest {
    pub query: String,
    /// Evaluation time in fractional seconds, as given by the client.
    pub time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeQueryRequest {
    pub query: String,
    pub start: String,
    pub end: String,
    pub step: String,
}

/// A single (timestamp, value) pair. `time` is decimal seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub time: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scalar {
    pub time: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub metric: BTreeMap<String, String>,
    pub point: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub metric: BTreeMap<String, String>,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult {
    Scalar(Scalar),
    Vector(Vec<Sample>),
    Matrix(Vec<Series>),
}

impl QueryResult {
    /// Name used for `resultType` in the HTTP API.
    pub fn result_type(&self) -> &'static str {
        match self {
            QueryResult::Scalar(_) => "scalar",
            QueryResult::Vector(_) => "vector",
            QueryResult::Matrix(_) => "matrix",
        }
    }
}
