//! Object upload.

use async_trait::async_trait;
use bf_error::{BfError, Result};
use bf_traits::{PutBody, Triggerable};
use bf_types::{Message, NodeStatus, ParameterSource};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::context::HandlerContext;
use crate::target::TargetConfig;

/// Content type used when the message does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Configuration for [`UploadHandler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    #[serde(flatten)]
    pub target: TargetConfig,

    /// Local file to upload; `msg.localFilename` is used when this yields nothing
    pub local_filename: Option<ParameterSource>,

    /// Pass the message on after a successful upload
    pub forward_input: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            local_filename: None,
            forward_input: true,
        }
    }
}

impl UploadConfig {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_local_filename(mut self, local_filename: ParameterSource) -> Self {
        self.local_filename = Some(local_filename);
        self
    }

    pub fn with_forward_input(mut self, forward_input: bool) -> Self {
        self.forward_input = forward_input;
        self
    }
}

/// Stores a local file, or the message payload, as one object.
///
/// A local file takes precedence over the payload. On success the store's
/// response (`ETag`, `VersionId`) is attached as `s3Response`.
pub struct UploadHandler {
    config: UploadConfig,
    ctx: HandlerContext,
}

impl UploadHandler {
    pub fn new(config: UploadConfig, ctx: HandlerContext) -> Self {
        Self { config, ctx }
    }

    pub async fn handle(&self, mut msg: Message) -> Result<Message> {
        let target = self.config.target.resolve(&self.ctx.resolver, &msg)?;
        let body = self.body(&msg)?;
        let content_type = msg
            .get_str("contentType")
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        self.ctx.reporter.status(NodeStatus::Uploading);

        let result = async {
            let store = self.ctx.connect(&target.connection).await?;
            store
                .put_object(&target.bucket, &target.key, &content_type, body)
                .await
        }
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.ctx.reporter.status(NodeStatus::Failed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        info!(
            bucket = %target.bucket,
            key = %target.key,
            content_type = %content_type,
            etag = ?response.etag,
            "Uploaded object"
        );

        let response = serde_json::to_value(&response)
            .map_err(|e| BfError::Sink(format!("JSON serialization failed: {e}")))?;
        msg.set("s3Response", response);
        self.ctx.reporter.status(NodeStatus::Clear);

        Ok(msg)
    }

    /// Pick the upload body: local file first, then the payload.
    fn body(&self, msg: &Message) -> Result<PutBody> {
        let configured = match &self.config.local_filename {
            Some(source) => self.ctx.resolver.resolve(source, msg)?,
            None => None,
        };

        if let Some(path) = configured.or_else(|| msg.get_str("localFilename").map(str::to_string)) {
            debug!(path = %path, "Uploading local file");
            return Ok(PutBody::File(PathBuf::from(path)));
        }

        msg.payload()
            .to_bytes()
            .map(PutBody::Bytes)
            .ok_or_else(|| BfError::config("No payload or local file to upload"))
    }
}

#[async_trait]
impl Triggerable for UploadHandler {
    async fn trigger(&self, msg: Message) -> Result<()> {
        match self.handle(msg.clone()).await {
            Ok(out) if self.config.forward_input => self.ctx.sink.emit(out).await,
            Ok(_) => Ok(()),
            Err(e) => {
                self.ctx.report(&e, &msg);
                Err(e)
            }
        }
    }
}
