//! Configuration types for the poller.

use bf_types::{BucketPrecedence, ParameterSource, StoreConnectionConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time between polls (15 minutes).
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(900);

/// Configuration for a bucket poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Where the bucket name comes from
    pub bucket: Option<ParameterSource>,

    /// Whether a `bucket` field on the trigger message may stand in for, or
    /// override, the configured bucket
    pub bucket_precedence: BucketPrecedence,

    /// Glob matched against full keys; empty means no filtering
    pub file_pattern: Option<String>,

    /// Time between scheduled polls
    #[serde(with = "duration_secs")]
    pub polling_interval: Duration,

    /// Delay before the first scheduled poll
    #[serde(with = "duration_secs")]
    pub startup_delay: Duration,

    /// Store connection parameters
    pub connection: StoreConnectionConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            bucket_precedence: BucketPrecedence::ConfiguredOnly,
            file_pattern: None,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            startup_delay: Duration::ZERO,
            connection: StoreConnectionConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Create a poller configuration for a bucket.
    pub fn new(bucket: ParameterSource) -> Self {
        Self {
            bucket: Some(bucket),
            ..Default::default()
        }
    }

    pub fn with_bucket_precedence(mut self, precedence: BucketPrecedence) -> Self {
        self.bucket_precedence = precedence;
        self
    }

    /// Set the glob pattern keys must match.
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_connection(mut self, connection: StoreConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// The filter pattern, if one is set and non-empty.
    pub fn pattern(&self) -> Option<&str> {
        self.file_pattern.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.polling_interval.is_zero() {
            return Err("polling_interval must be at least 1 second".to_string());
        }
        if let Some(pattern) = self.pattern() {
            glob::Pattern::new(pattern)
                .map_err(|e| format!("Invalid glob pattern '{pattern}': {e}"))?;
        }
        self.connection.validate()
    }
}

/// Serde helper for whole-second durations.
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
