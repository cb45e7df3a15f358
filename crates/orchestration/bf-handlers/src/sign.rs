//! Pre-signed URL generation.

use async_trait::async_trait;
use bf_error::{BfError, Result};
use bf_traits::Triggerable;
use bf_types::Message;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::context::HandlerContext;
use crate::target::TargetConfig;

/// Default lifetime of a signed URL.
pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 60;

/// Longest lifetime a SigV4 pre-signed URL may have (7 days).
const MAX_URL_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for [`SignHandler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    #[serde(flatten)]
    pub target: TargetConfig,

    /// Lifetime of the URL in seconds
    pub url_expiration: u64,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            url_expiration: DEFAULT_URL_EXPIRATION_SECS,
        }
    }
}

impl SignConfig {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_url_expiration(mut self, secs: u64) -> Self {
        self.url_expiration = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.url_expiration == 0 {
            return Err("url_expiration must be at least 1 second".to_string());
        }
        if self.url_expiration > MAX_URL_EXPIRATION_SECS {
            return Err(format!(
                "url_expiration must not exceed {MAX_URL_EXPIRATION_SECS} seconds"
            ));
        }
        self.target.connection.validate()
    }
}

/// Replaces the payload with a time-limited GET URL for one object.
///
/// No object data is transferred.
pub struct SignHandler {
    config: SignConfig,
    ctx: HandlerContext,
}

impl SignHandler {
    pub fn new(config: SignConfig, ctx: HandlerContext) -> Result<Self> {
        config.validate().map_err(BfError::Config)?;
        Ok(Self { config, ctx })
    }

    pub async fn handle(&self, mut msg: Message) -> Result<Message> {
        let target = self.config.target.resolve(&self.ctx.resolver, &msg)?;
        msg.set("bucket", target.bucket.as_str());
        msg.set("filename", target.key.as_str());

        let store = self.ctx.connect(&target.connection).await?;
        let url = store
            .presign_get(
                &target.bucket,
                &target.key,
                Duration::from_secs(self.config.url_expiration),
            )
            .await?;

        debug!(
            bucket = %target.bucket,
            key = %target.key,
            expires_in = self.config.url_expiration,
            "Generated signed URL"
        );

        msg.set_payload(url);
        Ok(msg)
    }
}

#[async_trait]
impl Triggerable for SignHandler {
    async fn trigger(&self, msg: Message) -> Result<()> {
        match self.handle(msg.clone()).await {
            Ok(out) => self.ctx.sink.emit(out).await,
            Err(e) => {
                self.ctx.report(&e, &msg);
                Err(e)
            }
        }
    }
}
