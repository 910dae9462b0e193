//! IndexerConfig - settings for the Nexus indexer.
//!
//! | env                 | meaning                              | default  |
//! |---------------------|--------------------------------------|----------|
//! | `NEXUS_URL`         | `data_index` endpoint of the server  | disabled |
//! | `NEXUS_INDEX_DELAY` | seconds between the end of one cycle and the start of the next | 60 |

use std::time::Duration;

use reqwest::Url;

use crate::domain::ConfigError;

pub const INDEX_URL_ENV: &str = "NEXUS_URL";
pub const INDEX_DELAY_ENV: &str = "NEXUS_INDEX_DELAY";

pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);
/// Warm-up before the first cycle.
pub const INITIAL_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECTOR_CLASSIFIER: &str = "connector";

/// When an artifact identity enters the "seen" set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeenPolicy {
    /// As soon as the index lists it. A broken artifact is attempted once.
    #[default]
    OnDiscovery,
    /// Only after its descriptor parsed. A broken artifact is retried every cycle.
    OnSuccess,
}

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// `None` disables indexing.
    pub index_url: Option<String>,
    pub delay: Duration,
    pub initial_delay: Duration,
    pub classifier: String,
    pub request_timeout: Duration,
    pub seen_policy: SeenPolicy,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            index_url: None,
            delay: DEFAULT_DELAY,
            initial_delay: INITIAL_DELAY,
            classifier: CONNECTOR_CLASSIFIER.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            seen_policy: SeenPolicy::default(),
        }
    }
}

impl IndexerConfig {
    pub fn new(index_url: Option<String>) -> Self {
        Self::default().with_index_url(index_url)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (env, test maps, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(INDEX_URL_ENV));
        if let Some(raw) = lookup(INDEX_DELAY_ENV) {
            config.delay = parse_delay(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// An empty url counts as "not configured".
    pub fn with_index_url(mut self, index_url: Option<String>) -> Self {
        self.index_url = index_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_seen_policy(mut self, seen_policy: SeenPolicy) -> Self {
        self.seen_policy = seen_policy;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.index_url.is_some()
    }

    /// The index url must be an absolute http(s) url.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(raw) = &self.index_url else {
            return Ok(());
        };
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }
}

/// Whole seconds, surrounding whitespace allowed.
pub fn parse_delay(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidDelay(raw.to_string()))
}
