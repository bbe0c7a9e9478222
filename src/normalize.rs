//! Converts collected measurements into the Atlas data model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{
    namespace::Namespace,
    observe::{DropReason, NoopObserver, Observer},
    template::{substitute, Variables},
    unit, Metric, RawValue, Tags,
};

pub const DEFAULT_NAME_TAG: &str = "name";
pub const UNIT_TAG: &str = "unit";

/// Tags that steer conversion but are never forwarded.
pub const IGNORED_TAGS: [&str; 2] = [UNIT_TAG, "plugin_running_on"];

/// A measurement as handed over by the collector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMeasurement {
    pub namespace: Namespace,
    #[serde(default)]
    pub tags: Tags,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    pub value: RawValue,
}
impl RawMeasurement {
    pub fn new(
        namespace: Namespace,
        tags: Tags,
        timestamp: DateTime<Utc>,
        value: impl Into<RawValue>,
    ) -> Self {
        Self {
            namespace,
            tags,
            timestamp,
            value: value.into(),
        }
    }
}

/// Builds the output tag map. The namespace forms the default name; an
/// explicit `name` tag overwrites it.
pub fn create_tags(namespace: &Namespace, tags: &Tags) -> Tags {
    let vars = Variables::from_namespace(namespace);
    let mut out = Tags::new();
    out.insert(DEFAULT_NAME_TAG.to_owned(), namespace.joined());
    for (k, v) in tags {
        if IGNORED_TAGS.iter().any(|&ignored| ignored == k.as_str()) {
            continue;
        }
        out.insert(k.clone(), substitute(v, &vars));
    }
    out
}

fn timestamp_millis(timestamp: &DateTime<Utc>) -> u64 {
    u64::try_from(timestamp.timestamp_millis()).unwrap_or_default()
}

/// `None` when the value is not a number.
pub fn to_metric(measurement: &RawMeasurement) -> Option<Metric> {
    let value = match measurement.value.to_f64() {
        Ok(v) => v,
        Err(e) => {
            debug!(namespace = %measurement.namespace, "dropping measurement: {}", e);
            return None;
        }
    };
    let value = match measurement.tags.get(UNIT_TAG) {
        Some(code) => unit::convert(code, value),
        None => value,
    };
    let tags = create_tags(&measurement.namespace, &measurement.tags);
    Some(Metric::new(
        tags,
        timestamp_millis(&measurement.timestamp),
        value,
    ))
}

pub fn to_metrics<'a>(measurements: impl IntoIterator<Item = &'a RawMeasurement>) -> Vec<Metric> {
    measurements.into_iter().filter_map(to_metric).collect()
}

/// Removes every measurement whose namespace path matches `exclude`.
pub fn filter_excluded(
    measurements: Vec<RawMeasurement>,
    exclude: Option<&Regex>,
) -> Vec<RawMeasurement> {
    match exclude {
        None => measurements,
        Some(re) => measurements
            .into_iter()
            .filter(|m| !re.is_match(&m.namespace.path()))
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    exclude: Option<Regex>,
    observer: Arc<dyn Observer>,
}
impl Normalizer {
    pub fn new(exclude: Option<Regex>) -> Self {
        Self {
            exclude,
            observer: Arc::new(NoopObserver),
        }
    }
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn normalize(&self, measurements: Vec<RawMeasurement>) -> Vec<Metric> {
        let measurements = filter_excluded(measurements, self.exclude.as_ref());
        measurements
            .iter()
            .filter_map(|m| {
                let metric = to_metric(m);
                if metric.is_none() {
                    self.observer.dropped(DropReason::NotANumber);
                }
                metric
            })
            .collect()
    }
}
impl Default for Normalizer {
    fn default() -> Self {
        Self::new(None)
    }
}
