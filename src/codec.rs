use thiserror::Error;

use crate::normalize::RawMeasurement;

/// Content type token for a JSON array of measurements.
pub const JSON_CONTENT_TYPE: &str = "atlas.json";

pub const ACCEPTED_CONTENT_TYPES: [&str; 1] = [JSON_CONTENT_TYPE];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown content type '{0}'")]
    UnsupportedContentType(String),

    #[error("failed to decode measurements: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn decode(content_type: &str, content: &[u8]) -> Result<Vec<RawMeasurement>, DecodeError> {
    match content_type {
        JSON_CONTENT_TYPE => Ok(serde_json::from_slice(content)?),
        other => Err(DecodeError::UnsupportedContentType(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawValue;

    #[test]
    fn test_decode_json() {
        let content = br#"[
            {
                "namespace": [{"value": "intel"}, {"value": "h1", "name": "host"}, {"value": "load"}],
                "tags": {"unit": "ms"},
                "timestamp": "2016-05-01T12:00:00Z",
                "data": 12
            },
            {
                "namespace": [{"value": "x"}],
                "timestamp": "2016-05-01T12:00:00.250Z",
                "data": "text"
            }
        ]"#;
        let measurements = decode(JSON_CONTENT_TYPE, content).unwrap();
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].namespace.joined(), "intel.h1.load");
        assert!(measurements[0].namespace.elements()[1].is_dynamic());
        assert_eq!(measurements[0].tags["unit"], "ms");
        assert_eq!(measurements[0].value, RawValue::U64(12));
        assert!(measurements[1].tags.is_empty());
        assert_eq!(measurements[1].timestamp.timestamp_millis(), 1_462_104_000_250);
        assert_eq!(measurements[1].value, RawValue::Str("text".into()));
    }

    #[test]
    fn test_decode_unsupported() {
        let err = decode("snap.gob", b"[]").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedContentType(ref t) if t == "snap.gob"));
        assert_eq!(err.to_string(), "unknown content type 'snap.gob'");
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode(JSON_CONTENT_TYPE, b"{not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
