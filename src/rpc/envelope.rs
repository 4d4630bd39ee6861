use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::json::{base64_bytes, int_string};

/// One telemetry record. The gateway never inspects or mutates the payload;
/// it only moves envelopes between producers, the ring buffer and the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Nanoseconds since the Unix epoch.
    #[serde(with = "int_string", default)]
    pub timestamp: i64,
    #[serde(default)]
    pub source_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(flatten)]
    pub message: Option<EnvelopeMessage>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeMessage {
    Log(Log),
    Counter(Counter),
    Gauge(Gauge),
    Timer(Timer),
    Event(Event),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    #[default]
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "ERR")]
    Err,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    #[serde(with = "base64_bytes", default)]
    pub payload: Vec<u8>,
    #[serde(rename = "type", default)]
    pub log_type: LogType,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    #[serde(with = "int_string", default)]
    pub delta: u64,
    #[serde(with = "int_string", default)]
    pub total: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeValue {
    #[serde(default)]
    pub unit: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub metrics: BTreeMap<String, GaugeValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub name: String,
    #[serde(with = "int_string", default)]
    pub start: i64,
    #[serde(with = "int_string", default)]
    pub stop: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeBatch {
    #[serde(default)]
    pub batch: Vec<Envelope>,
}

impl From<Vec<Envelope>> for EnvelopeBatch {
    fn from(batch: Vec<Envelope>) -> Self {
        Self { batch }
    }
}

/// Envelope kinds a read can be restricted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeType {
    Any,
    Log,
    Counter,
    Gauge,
    Timer,
    Event,
}

impl EnvelopeType {
    pub fn all() -> &'static [EnvelopeType] {
        &[
            EnvelopeType::Any,
            EnvelopeType::Log,
            EnvelopeType::Counter,
            EnvelopeType::Gauge,
            EnvelopeType::Timer,
            EnvelopeType::Event,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnvelopeType::Any => "ANY",
            EnvelopeType::Log => "LOG",
            EnvelopeType::Counter => "COUNTER",
            EnvelopeType::Gauge => "GAUGE",
            EnvelopeType::Timer => "TIMER",
            EnvelopeType::Event => "EVENT",
        }
    }

    /// Exact, case-sensitive match on the enum member name.
    pub fn from_name(name: &str) -> Option<EnvelopeType> {
        match name {
            "ANY" => Some(EnvelopeType::Any),
            "LOG" => Some(EnvelopeType::Log),
            "COUNTER" => Some(EnvelopeType::Counter),
            "GAUGE" => Some(EnvelopeType::Gauge),
            "TIMER" => Some(EnvelopeType::Timer),
            "EVENT" => Some(EnvelopeType::Event),
            _ => None,
        }
    }
}
