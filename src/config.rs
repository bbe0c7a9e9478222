//! Publisher configuration as resolved by the hosting framework.

use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::Tags;

pub const URI_KEY: &str = "uri";
pub const EXCLUDE_KEY: &str = "exclude";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config key '{0}'")]
    MissingKey(&'static str),
}

/// Declared configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRule {
    pub key: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub fn config_policy() -> Vec<ConfigRule> {
    vec![
        ConfigRule {
            key: URI_KEY,
            required: true,
            description: "URI for Atlas server.",
        },
        ConfigRule {
            key: EXCLUDE_KEY,
            required: false,
            description: "Regex on the namespace to exclude certain metrics.",
        },
    ]
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub uri: String,
    pub exclude: Option<Regex>,
    pub common_tags: Tags,
}
impl PublisherConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            exclude: None,
            common_tags: Tags::new(),
        }
    }

    /// Reads `uri` and `exclude`. An exclude pattern that fails to compile is
    /// logged and ignored.
    pub fn from_map(values: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let uri = values
            .get(URI_KEY)
            .ok_or(ConfigError::MissingKey(URI_KEY))?;
        let mut config = Self::new(uri.as_str());
        config.exclude = values.get(EXCLUDE_KEY).and_then(|p| compile_exclude(p));
        Ok(config)
    }

    pub fn with_exclude(mut self, exclude: Option<Regex>) -> Self {
        self.exclude = exclude;
        self
    }
    pub fn with_common_tags(mut self, common_tags: Tags) -> Self {
        self.common_tags = common_tags;
        self
    }
}

pub fn compile_exclude(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("failed to compile exclude pattern '{}': {}", pattern, e);
            None
        }
    }
}
