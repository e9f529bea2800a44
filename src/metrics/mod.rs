//! The metric record exchanged with the collector.
//!
//! A record is either a gauge, which carries an absolute `value`, or a
//! counter, which carries a `delta` the collector adds to its running total.
//! The JSON form omits whichever field does not apply:
//!
//! ```text
//! {"id":"Alloc","mtype":"gauge","value":1024.0}
//! {"id":"PollCount","mtype":"counter","delta":1}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Counter => write!(f, "counter"),
        }
    }
}

/// A single metric sample. Exactly one of `delta` or `value` is present and
/// it always agrees with `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct MetricRecord {
    id: String,
    #[serde(rename = "mtype")]
    kind: MetricKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
}

impl MetricRecord {
    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Gauge,
            delta: None,
            value: Some(value),
        }
    }

    pub fn counter(id: impl Into<String>, delta: i64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Counter,
            delta: Some(delta),
            value: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn delta(&self) -> Option<i64> {
        self.delta
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("metric id is empty")]
    EmptyId,
    #[error("gauge '{0}' must carry a value and no delta")]
    MalformedGauge(String),
    #[error("counter '{0}' must carry a delta and no value")]
    MalformedCounter(String),
}

// wire form, validated before it becomes a `MetricRecord`
#[derive(Deserialize)]
struct RawRecord {
    id: String,
    mtype: MetricKind,
    #[serde(default)]
    delta: Option<i64>,
    #[serde(default)]
    value: Option<f64>,
}

impl TryFrom<RawRecord> for MetricRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        if raw.id.is_empty() {
            return Err(RecordError::EmptyId);
        }

        match (raw.mtype, raw.delta, raw.value) {
            (MetricKind::Gauge, None, Some(value)) => Ok(Self::gauge(raw.id, value)),
            (MetricKind::Counter, Some(delta), None) => Ok(Self::counter(raw.id, delta)),
            (MetricKind::Gauge, _, _) => Err(RecordError::MalformedGauge(raw.id)),
            (MetricKind::Counter, _, _) => Err(RecordError::MalformedCounter(raw.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gauge_omits_delta() {
        let record = MetricRecord::gauge("Alloc", 1024.0);
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, json!({"id": "Alloc", "mtype": "gauge", "value": 1024.0}));
    }

    #[test]
    fn test_counter_omits_value() {
        let record = MetricRecord::counter("PollCount", 1);
        let encoded = serde_json::to_string(&record).unwrap();
        assert_eq!(encoded, r#"{"id":"PollCount","mtype":"counter","delta":1}"#);
    }

    #[test]
    fn test_shape_matches_kind() {
        let gauge = MetricRecord::gauge("RandomValue", 0.5);
        assert_eq!(gauge.kind(), MetricKind::Gauge);
        assert!(gauge.value().is_some() && gauge.delta().is_none());

        let counter = MetricRecord::counter("PollCount", 1);
        assert_eq!(counter.kind(), MetricKind::Counter);
        assert!(counter.delta().is_some() && counter.value().is_none());
    }

    #[test]
    fn test_decode_valid() {
        let record: MetricRecord =
            serde_json::from_str(r#"{"id":"Sys","mtype":"gauge","value":3.5}"#).unwrap();
        assert_eq!(record, MetricRecord::gauge("Sys", 3.5));
    }

    #[test]
    fn test_decode_rejects_mismatched_fields() {
        let both = r#"{"id":"Sys","mtype":"gauge","value":1.0,"delta":1}"#;
        assert!(serde_json::from_str::<MetricRecord>(both).is_err());

        let missing = r#"{"id":"PollCount","mtype":"counter"}"#;
        assert!(serde_json::from_str::<MetricRecord>(missing).is_err());

        let null_value = r#"{"id":"PollCount","mtype":"counter","delta":2,"value":null}"#;
        assert!(serde_json::from_str::<MetricRecord>(null_value).is_ok());
    }

    #[test]
    fn test_decode_rejects_empty_id() {
        let empty = r#"{"id":"","mtype":"counter","delta":1}"#;
        assert!(serde_json::from_str::<MetricRecord>(empty).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let unknown = r#"{"id":"x","mtype":"histogram","value":1.0}"#;
        assert!(serde_json::from_str::<MetricRecord>(unknown).is_err());
    }
}
