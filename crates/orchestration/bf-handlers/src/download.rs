//! Object download.

use async_trait::async_trait;
use bf_error::{BfError, Result};
use bf_traits::{Triggerable, read_body};
use bf_types::{Message, NodeStatus, Payload};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::HandlerContext;
use crate::target::TargetConfig;

/// Configuration for [`DownloadHandler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    #[serde(flatten)]
    pub target: TargetConfig,

    /// Keep the body as bytes; otherwise it is decoded as (lossy) UTF-8 text
    pub return_buffer: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            return_buffer: true,
        }
    }
}

impl DownloadConfig {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_return_buffer(mut self, return_buffer: bool) -> Self {
        self.return_buffer = return_buffer;
        self
    }
}

/// Fetches one object into the message payload.
pub struct DownloadHandler {
    config: DownloadConfig,
    ctx: HandlerContext,
}

impl DownloadHandler {
    pub fn new(config: DownloadConfig, ctx: HandlerContext) -> Self {
        Self { config, ctx }
    }

    /// Download the object named by `msg` and return the updated message.
    ///
    /// Sets `bucket` and `filename` on the message and replaces the payload
    /// with the full object body.
    pub async fn handle(&self, mut msg: Message) -> Result<Message> {
        let target = self.config.target.resolve(&self.ctx.resolver, &msg)?;
        msg.set("bucket", target.bucket.as_str());
        msg.set("filename", target.key.as_str());

        let store = self.ctx.connect(&target.connection).await?;
        let body = store.get_object(&target.bucket, &target.key).await?;
        let data = read_body(body).await?;

        debug!(bucket = %target.bucket, key = %target.key, bytes = data.len(), "Downloaded object");

        let payload = if self.config.return_buffer {
            Payload::Bytes(data)
        } else {
            Payload::Text(String::from_utf8_lossy(&data).into_owned())
        };
        msg.set_payload(payload);

        Ok(msg)
    }
}

#[async_trait]
impl Triggerable for DownloadHandler {
    async fn trigger(&self, msg: Message) -> Result<()> {
        match self.handle(msg.clone()).await {
            Ok(out) => self.ctx.sink.emit(out).await,
            Err(e) => {
                self.ctx.report(&e, &msg);
                if !matches!(e, BfError::Config(_)) {
                    self.ctx.reporter.status(NodeStatus::Error {
                        message: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }
}
