//! Renders PromQL results in the Prometheus HTTP API shape:
//! `{"status":"success","data":{"resultType":..,"result":..}}`.
//!
//! Sample pairs are `[<time>, "<value>"]`. The time is emitted as a JSON
//! number copied verbatim from the backend; the value is always a decimal
//! string so no precision is lost and zero is never dropped.

use serde::Serialize;
use serde_json::value::RawValue;
use std::collections::BTreeMap;

use super::GatewayError;
use crate::rpc::{Point, QueryResult};

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub status: &'static str,
    pub data: QueryData,
}

#[derive(Debug, Serialize)]
pub struct QueryData {
    #[serde(rename = "resultType")]
    pub result_type: &'static str,
    pub result: ResultValue,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Scalar(SamplePair),
    Vector(Vec<VectorSample>),
    Matrix(Vec<MatrixSeries>),
}

#[derive(Debug, Serialize)]
pub struct SamplePair(Box<RawValue>, String);

#[derive(Debug, Serialize)]
pub struct VectorSample {
    pub metric: BTreeMap<String, String>,
    pub value: SamplePair,
}

#[derive(Debug, Serialize)]
pub struct MatrixSeries {
    pub metric: BTreeMap<String, String>,
    pub values: Vec<SamplePair>,
}

pub fn encode_query_result(result: QueryResult) -> Result<QueryResponse, GatewayError> {
    let result_type = result.result_type();
    let result = match result {
        QueryResult::Scalar(scalar) => ResultValue::Scalar(pair(&scalar.time, scalar.value)?),
        QueryResult::Vector(samples) => ResultValue::Vector(
            samples
                .into_iter()
                .map(|sample| {
                    Ok(VectorSample {
                        value: point_pair(&sample.point)?,
                        metric: sample.metric,
                    })
                })
                .collect::<Result<_, GatewayError>>()?,
        ),
        QueryResult::Matrix(series) => ResultValue::Matrix(
            series
                .into_iter()
                .map(|s| {
                    Ok(MatrixSeries {
                        values: s.points.iter().map(point_pair).collect::<Result<_, _>>()?,
                        metric: s.metric,
                    })
                })
                .collect::<Result<_, GatewayError>>()?,
        ),
    };

    Ok(QueryResponse {
        status: "success",
        data: QueryData {
            result_type,
            result,
        },
    })
}

fn point_pair(point: &Point) -> Result<SamplePair, GatewayError> {
    pair(&point.time, point.value)
}

fn pair(time: &str, value: f64) -> Result<SamplePair, GatewayError> {
    let invalid = || GatewayError::Encode(format!("invalid sample timestamp {:?}", time));

    serde_json::from_str::<serde_json::Number>(time).map_err(|_| invalid())?;
    let time = RawValue::from_string(time.to_string()).map_err(|_| invalid())?;
    Ok(SamplePair(time, format_value(value)))
}

/// Shortest decimal form without exponent, plus Prometheus' spellings of the
/// non-finite values.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{Sample, Scalar, Series};

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn zero_scalar_keeps_its_value() {
        let encoded = encode_query_result(QueryResult::Scalar(Scalar {
            time: "99".to_string(),
            value: 0.0,
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_string(&encoded).unwrap(),
            r#"{"status":"success","data":{"resultType":"scalar","result":[99,"0"]}}"#
        );
    }

    #[test]
    fn fractional_time_is_copied_verbatim() {
        let encoded = encode_query_result(QueryResult::Scalar(Scalar {
            time: "1234.000".to_string(),
            value: 1.5,
        }))
        .unwrap();

        let json = serde_json::to_string(&encoded).unwrap();
        assert!(json.contains(r#"[1234.000,"1.5"]"#), "{}", json);
    }

    #[test]
    fn vector_samples_use_value_key() {
        let encoded = encode_query_result(QueryResult::Vector(vec![Sample {
            metric: labels(&[("__name__", "cpu"), ("source_id", "a")]),
            point: Point {
                time: "10".to_string(),
                value: 42.25,
            },
        }]))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            serde_json::json!({
                "status": "success",
                "data": {
                    "resultType": "vector",
                    "result": [
                        {"metric": {"__name__": "cpu", "source_id": "a"}, "value": [10, "42.25"]}
                    ]
                }
            })
        );
    }

    #[test]
    fn matrix_series_use_values_key() {
        let encoded = encode_query_result(QueryResult::Matrix(vec![Series {
            metric: BTreeMap::new(),
            points: vec![
                Point {
                    time: "1".to_string(),
                    value: 1.0,
                },
                Point {
                    time: "2".to_string(),
                    value: -0.5,
                },
            ],
        }]))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            serde_json::json!({
                "status": "success",
                "data": {
                    "resultType": "matrix",
                    "result": [{"metric": {}, "values": [[1, "1"], [2, "-0.5"]]}]
                }
            })
        );
    }

    #[test]
    fn empty_vector_renders_empty_array() {
        let encoded = encode_query_result(QueryResult::Vector(Vec::new())).unwrap();
        let json = serde_json::to_string(&encoded).unwrap();
        assert_eq!(
            json,
            r#"{"status":"success","data":{"resultType":"vector","result":[]}}"#
        );
    }

    #[test]
    fn non_numeric_time_is_an_encode_error() {
        for time in ["", "abc", "\"99\"", "{}"] {
            let result = encode_query_result(QueryResult::Scalar(Scalar {
                time: time.to_string(),
                value: 1.0,
            }));
            assert!(matches!(result, Err(GatewayError::Encode(_))), "{:?}", time);
        }
    }

    #[test]
    fn values_render_without_exponent() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(0.000001), "0.000001");
        assert_eq!(format_value(1e21), "1000000000000000000000");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }
}
