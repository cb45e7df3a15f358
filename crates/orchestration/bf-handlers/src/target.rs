//! Bucket and key resolution shared by the handlers.

use bf_error::{BfError, Result};
use bf_resolver::{ParameterResolver, resolve, resolve_bucket, resolve_connection};
use bf_types::{BucketPrecedence, Message, ParameterSource, ResolvedConnection, StoreConnectionConfig};
use serde::{Deserialize, Serialize};

/// Which object a handler works on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Configured bucket; `msg.bucket` is consulted according to the precedence
    pub bucket: Option<ParameterSource>,

    pub bucket_precedence: BucketPrecedence,

    /// Configured key; `msg.filename` is used when this yields nothing
    pub filename: Option<ParameterSource>,

    pub connection: StoreConnectionConfig,
}

impl TargetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, bucket: ParameterSource) -> Self {
        self.bucket = Some(bucket);
        self
    }

    pub fn with_bucket_precedence(mut self, precedence: BucketPrecedence) -> Self {
        self.bucket_precedence = precedence;
        self
    }

    pub fn with_filename(mut self, filename: ParameterSource) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_connection(mut self, connection: StoreConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Resolve bucket, key and connection for one message.
    pub fn resolve(&self, resolver: &ParameterResolver, msg: &Message) -> Result<Target> {
        let ctx = resolver.context(msg);

        let bucket = resolve_bucket(self.bucket.as_ref(), self.bucket_precedence, &ctx)?
            .ok_or_else(|| BfError::config("No S3 bucket specified"))?;

        let configured_key = match &self.filename {
            Some(source) => resolve(source, &ctx)?,
            None => None,
        };
        let key = configured_key
            .or_else(|| msg.get_str("filename").map(str::to_string))
            .ok_or_else(|| BfError::config("No S3 file key (filename) specified"))?;

        let connection = resolve_connection(&self.connection, &ctx)?;

        Ok(Target {
            bucket,
            key,
            connection,
        })
    }
}

/// A fully resolved object location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub bucket: String,
    pub key: String,
    pub connection: ResolvedConnection,
}
