//! Entry point invoked by the hosting framework: decode, filter, normalize
//! and deliver one payload.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    client::{AtlasClient, HttpTransport, Transport},
    codec::{self, DecodeError, ACCEPTED_CONTENT_TYPES},
    config::PublisherConfig,
    normalize::Normalizer,
    observe::{NoopObserver, Observer},
};

pub const NAME: &str = "atlas";
pub const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMeta {
    pub name: &'static str,
    pub version: u32,
    pub accepted_content_types: Vec<&'static str>,
    pub returned_content_types: Vec<&'static str>,
}

pub fn meta() -> PluginMeta {
    PluginMeta {
        name: NAME,
        version: VERSION,
        accepted_content_types: ACCEPTED_CONTENT_TYPES.to_vec(),
        returned_content_types: ACCEPTED_CONTENT_TYPES.to_vec(),
    }
}

/// Only input decoding failures reach the caller; delivery is best effort.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone)]
pub struct AtlasPublisher<T = HttpTransport> {
    transport: T,
    observer: Arc<dyn Observer>,
}
impl AtlasPublisher<HttpTransport> {
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new())
    }
}
impl Default for AtlasPublisher<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T: Transport + Clone> AtlasPublisher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            observer: Arc::new(NoopObserver),
        }
    }
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn publish(
        &self,
        content_type: &str,
        content: &[u8],
        config: &PublisherConfig,
    ) -> Result<(), PublishError> {
        info!("publishing started");
        info!("URI {}", config.uri);

        let measurements = codec::decode(content_type, content).map_err(|e| {
            error!("error decoding: {}", e);
            e
        })?;

        let metrics = Normalizer::new(config.exclude.clone())
            .with_observer(self.observer.clone())
            .normalize(measurements);
        let client =
            AtlasClient::with_transport(&config.uri, &config.common_tags, self.transport.clone())
                .with_observer(self.observer.clone());
        client.publish(&metrics);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{client::DeliveryError, codec::JSON_CONTENT_TYPE, observe::CountingObserver};

    #[derive(Debug, Clone, Default)]
    struct Recorder {
        posts: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    }
    impl Transport for Recorder {
        fn post(&self, uri: &str, body: &[u8]) -> Result<(), DeliveryError> {
            let body = serde_json::from_slice(body).unwrap();
            self.posts.lock().unwrap().push((uri.to_owned(), body));
            Ok(())
        }
    }

    const CONTENT: &[u8] = br#"[
        {"namespace": [{"value": "foo"}], "timestamp": "1970-01-01T00:00:01Z", "data": 99},
        {"namespace": [{"value": "foo"}], "tags": {"unit": "Ki"}, "timestamp": "1970-01-01T00:00:02Z", "data": 99},
        {"namespace": [{"value": "bar"}], "timestamp": "1970-01-01T00:00:03Z", "data": "nope"},
        {"namespace": [{"value": "skip"}, {"value": "me"}], "timestamp": "1970-01-01T00:00:04Z", "data": 1}
    ]"#;

    #[test]
    fn test_meta() {
        let meta = meta();
        assert_eq!(meta.name, "atlas");
        assert_eq!(meta.version, 1);
        assert_eq!(meta.accepted_content_types, vec![JSON_CONTENT_TYPE]);
    }

    #[test]
    fn test_publish_end_to_end() {
        let recorder = Recorder::default();
        let observer = Arc::new(CountingObserver::new());
        let publisher = AtlasPublisher::with_transport(recorder.clone()).with_observer(observer.clone());
        let config = PublisherConfig::new("http://atlas/api/v1/publish")
            .with_exclude(regex::Regex::new("^/skip").ok());

        publisher
            .publish(JSON_CONTENT_TYPE, CONTENT, &config)
            .unwrap();

        let posts = recorder.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "http://atlas/api/v1/publish");
        assert_eq!(
            posts[0].1,
            serde_json::json!({
                "tags": {},
                "metrics": [
                    {"tags": {"name": "foo"}, "timestamp": 1000, "value": 99},
                    {"tags": {"name": "foo"}, "timestamp": 2000, "value": 101376},
                ]
            })
        );
        assert_eq!(observer.not_a_number(), 1);
        assert_eq!(observer.sent(), 2);
    }

    #[test]
    fn test_publish_unknown_content_type() {
        let recorder = Recorder::default();
        let publisher = AtlasPublisher::with_transport(recorder.clone());
        let err = publisher
            .publish("snap.gob", CONTENT, &PublisherConfig::new("http://atlas/"))
            .unwrap_err();
        assert!(matches!(
            err,
            PublishError::Decode(DecodeError::UnsupportedContentType(_))
        ));
        assert!(recorder.posts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_publish_nothing_to_send() {
        let recorder = Recorder::default();
        let publisher = AtlasPublisher::with_transport(recorder.clone());
        publisher
            .publish(JSON_CONTENT_TYPE, b"[]", &PublisherConfig::new("http://atlas/"))
            .unwrap();
        assert!(recorder.posts.lock().unwrap().is_empty());
    }
}
