//! Object-store connection settings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parameter::ParameterSource;

/// Connection settings as configured, before any value is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConnectionConfig {
    /// Region (required, must resolve to a non-empty value)
    pub region: ParameterSource,

    /// Custom endpoint URL (MinIO, LocalStack, ...)
    #[serde(default)]
    pub endpoint: Option<ParameterSource>,

    /// Use path-style addressing (`endpoint/bucket/key`)
    #[serde(default)]
    pub force_path_style: bool,

    /// Talk to the custom endpoint without TLS
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Use credentials from the execution environment; explicit keys are ignored
    #[serde(default)]
    pub use_managed_identity: bool,

    #[serde(default)]
    pub access_key_id: Option<ParameterSource>,

    #[serde(default)]
    pub secret_access_key: Option<ParameterSource>,

    /// Per-operation timeout in seconds for store calls
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum attempts for the store client's own retry policy
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for StoreConnectionConfig {
    fn default() -> Self {
        Self {
            region: ParameterSource::literal("us-east-1"),
            endpoint: None,
            force_path_style: false,
            skip_tls_verify: false,
            use_managed_identity: false,
            access_key_id: None,
            secret_access_key: None,
            timeout_secs: None,
            max_attempts: None,
        }
    }
}

impl StoreConnectionConfig {
    /// Create a connection config for the given region source.
    pub fn new(region: ParameterSource) -> Self {
        Self {
            region,
            ..Default::default()
        }
    }

    /// Set a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: ParameterSource) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    pub fn with_skip_tls_verify(mut self, skip_tls_verify: bool) -> Self {
        self.skip_tls_verify = skip_tls_verify;
        self
    }

    pub fn with_managed_identity(mut self, use_managed_identity: bool) -> Self {
        self.use_managed_identity = use_managed_identity;
        self
    }

    /// Set explicit credential sources.
    pub fn with_credentials(
        mut self,
        access_key_id: ParameterSource,
        secret_access_key: ParameterSource,
    ) -> Self {
        self.access_key_id = Some(access_key_id);
        self.secret_access_key = Some(secret_access_key);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Validate static settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be at least 1".to_string());
        }
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Credentials attached to a store client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Provided by the environment (managed identity, profile, instance role)
    Ambient,

    /// Explicit key pair
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
}

impl Credentials {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static { .. })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambient => write!(f, "Ambient"),
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Connection settings after resolution for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub skip_tls_verify: bool,
    pub credentials: Credentials,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl ResolvedConnection {
    /// A connection with ambient credentials and no custom endpoint.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            force_path_style: false,
            skip_tls_verify: false,
            credentials: Credentials::Ambient,
            timeout_secs: None,
            max_attempts: None,
        }
    }
}
