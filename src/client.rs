use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    observe::{DropReason, NoopObserver, Observer},
    sanitize::sanitize_tags,
    Metric, Tags,
};

/// Maximum number of datapoints sent per request.
pub const METRIC_BATCH_SIZE: usize = 10_000;

pub const JSON_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode metrics as json: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("status code {code}: {body}")]
    Status { code: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Request body: common tags plus one batch of datapoints.
#[derive(Debug, Serialize)]
pub struct MetricBatch<'a> {
    pub tags: &'a Tags,
    pub metrics: &'a [Metric],
}

pub trait Transport {
    /// Sends one encoded batch. Anything but a 200 is an error.
    fn post(&self, uri: &str, body: &[u8]) -> Result<(), DeliveryError>;
}
impl<F> Transport for F
where
    F: Fn(&str, &[u8]) -> Result<(), DeliveryError>,
{
    fn post(&self, uri: &str, body: &[u8]) -> Result<(), DeliveryError> {
        self(uri, body)
    }
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}
impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::new();
        Self { agent }
    }
}
impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}
impl Transport for HttpTransport {
    fn post(&self, uri: &str, body: &[u8]) -> Result<(), DeliveryError> {
        let resp = self
            .agent
            .post(uri)
            .set("Content-Type", JSON_MIME)
            .send_bytes(body);
        match resp {
            Ok(resp) if resp.status() == 200 => Ok(()),
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => {
                let code = resp.status();
                let body = resp.into_string().unwrap_or_default();
                Err(DeliveryError::Status { code, body })
            }
            Err(e) => Err(DeliveryError::Transport(e.to_string())),
        }
    }
}

/// Publishes metrics to an Atlas endpoint.
///
/// Holds only the destination and the sanitized common tags, so one client
/// can serve any number of `publish` calls.
#[derive(Debug, Clone)]
pub struct AtlasClient<T = HttpTransport> {
    uri: String,
    common_tags: Tags,
    transport: T,
    observer: Arc<dyn Observer>,
}
impl AtlasClient<HttpTransport> {
    /// - `uri`: the full uri to use for the POST request.
    /// - `common_tags`: tags applied to all datapoints being sent, typically
    ///   infrastructure tags like the cluster and node.
    pub fn new(uri: impl Into<String>, common_tags: &Tags) -> Self {
        Self::with_transport(uri, common_tags, HttpTransport::new())
    }
}
impl<T: Transport> AtlasClient<T> {
    pub fn with_transport(uri: impl Into<String>, common_tags: &Tags, transport: T) -> Self {
        Self {
            uri: uri.into(),
            common_tags: sanitize_tags(common_tags),
            transport,
            observer: Arc::new(NoopObserver),
        }
    }
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
    pub fn common_tags(&self) -> &Tags {
        &self.common_tags
    }

    /// Sends all metrics, one request per batch. Failures are logged per batch
    /// and never stop the remaining batches.
    pub fn publish(&self, metrics: &[Metric]) {
        if metrics.is_empty() {
            info!("empty metric list, nothing to send");
            return;
        }
        info!("sending {} metrics to {}", metrics.len(), self.uri);
        for batch in metrics.chunks(METRIC_BATCH_SIZE) {
            match self.send_batch(batch) {
                Ok(sent) => {
                    info!("successfully sent {} metrics to {}", sent, self.uri);
                    self.observer.batch_sent(sent);
                }
                Err(e) => {
                    error!("post to {} failed: {}", self.uri, e);
                    self.observer.batch_failed(&e);
                }
            }
        }
    }

    /// Sanitizes, filters, encodes and posts one batch. Returns the number of
    /// metrics in the request body.
    pub(crate) fn send_batch(&self, batch: &[Metric]) -> Result<usize, DeliveryError> {
        let sanitized = batch
            .iter()
            .map(|m| Metric::new(sanitize_tags(&m.tags), m.timestamp, m.value))
            .collect();
        let metrics = self.filter_numbers(sanitized);
        let body = encode_batch(&self.common_tags, &metrics)?;
        self.transport.post(&self.uri, &body)?;
        Ok(metrics.len())
    }

    /// Drops NaN and infinities, which standard json cannot represent.
    fn filter_numbers(&self, mut metrics: Vec<Metric>) -> Vec<Metric> {
        metrics.retain(|m| {
            let keep = m.value.is_finite();
            if !keep {
                debug!(tags = ?m.tags, value = m.value, "dropping non-finite value");
                self.observer.dropped(DropReason::NonFinite);
            }
            keep
        });
        metrics
    }
}

pub fn encode_batch(common_tags: &Tags, metrics: &[Metric]) -> Result<Vec<u8>, DeliveryError> {
    let batch = MetricBatch {
        tags: common_tags,
        metrics,
    };
    Ok(serde_json::to_vec(&batch)?)
}
