//! Normalizes collected measurements into Atlas metrics and publishes them
//! over HTTP in size-bounded JSON batches.

pub mod client;
pub mod codec;
pub mod config;
pub mod namespace;
pub mod normalize;
pub mod observe;
pub mod publisher;
pub mod sanitize;
pub mod template;
pub mod unit;
pub mod value;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

pub use client::{AtlasClient, DeliveryError, HttpTransport, Transport, METRIC_BATCH_SIZE};
pub use config::PublisherConfig;
pub use namespace::{Namespace, NamespaceElement};
pub use normalize::{Normalizer, RawMeasurement};
pub use observe::{CountingObserver, DropReason, NoopObserver, Observer};
pub use publisher::{AtlasPublisher, PublishError};
pub use value::RawValue;

/// Tag key to tag value. Ordered so encoded bodies are deterministic.
pub type Tags = BTreeMap<String, String>;

/// Canonical datapoint, the unit of delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub tags: Tags,
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
    #[serde(serialize_with = "serialize_value")]
    pub value: f64,
}
impl Metric {
    pub fn new(tags: Tags, timestamp: u64, value: f64) -> Self {
        Self {
            tags,
            timestamp,
            value,
        }
    }
}

// Largest magnitude below which every integral f64 is exactly an i64.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Integral values go out as `42`, not `42.0`.
fn serialize_value<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let v = *value;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < EXACT_INT_LIMIT {
        serializer.serialize_i64(v as i64)
    } else {
        serializer.serialize_f64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: f64) -> String {
        let metric = Metric::new(Tags::new(), 0, value);
        serde_json::to_string(&metric).unwrap()
    }

    #[test]
    fn test_metric_field_order() {
        let mut tags = Tags::new();
        tags.insert("name".into(), "bar".into());
        let metric = Metric::new(tags, 0, 42.0);
        assert_eq!(
            serde_json::to_string(&metric).unwrap(),
            r#"{"tags":{"name":"bar"},"timestamp":0,"value":42}"#
        );
    }

    #[test]
    fn test_value_encoding() {
        assert!(encode(42.0).ends_with(r#""value":42}"#));
        assert!(encode(-7.0).ends_with(r#""value":-7}"#));
        assert!(encode(0.5).ends_with(r#""value":0.5}"#));
        assert!(encode(1e300).ends_with(r#""value":1e300}"#));
    }

    #[test]
    fn test_metric_decode() {
        let metric: Metric =
            serde_json::from_str(r#"{"tags":{"name":"a"},"timestamp":5,"value":3}"#).unwrap();
        assert_eq!(metric.timestamp, 5);
        assert_eq!(metric.value, 3.0);
        assert_eq!(metric.tags["name"], "a");
    }
}
