//! [`ObjectStore`] implementation over the AWS SDK.

use async_stream::try_stream;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::Object;
use bf_error::{BfError, Result, TransferError};
use bf_traits::{ListPage, ObjectBody, ObjectStore, PutBody, PutResult, StoreFactory};
use bf_types::{ObjectEntry, ResolvedConnection};
use bytes::Bytes;
use chrono::DateTime;
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::client::create_s3_client;

/// S3-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_entry(obj: &Object) -> Option<ObjectEntry> {
    let key = obj.key()?;
    if key.is_empty() {
        return None;
    }

    let mut entry = ObjectEntry::new(key, obj.size().unwrap_or(0).max(0) as u64);
    if let Some(last_modified) = obj
        .last_modified()
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
    {
        entry = entry.with_last_modified(last_modified);
    }
    if let Some(etag) = obj.e_tag() {
        entry = entry.with_etag(etag);
    }
    if let Some(class) = obj.storage_class() {
        entry = entry.with_storage_class(class.as_str());
    }
    Some(entry)
}

/// Chunks of a `GetObject` body as they arrive.
fn body_stream(
    mut body: ByteStream,
    bucket: String,
    key: String,
) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    try_stream! {
        while let Some(chunk) = body.try_next().await.map_err(|e| TransferError::Get {
            bucket: bucket.clone(),
            key: key.clone(),
            reason: format!("Error reading S3 object: {e}"),
        })? {
            yield chunk;
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_objects(&self, bucket: &str, marker: Option<&str>) -> Result<ListPage> {
        let mut req = self.client.list_objects().bucket(bucket);

        if let Some(marker) = marker {
            req = req.marker(marker);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BfError::listing(bucket, DisplayErrorContext(&e)))?;

        let entries: Vec<ObjectEntry> = resp.contents().iter().filter_map(to_entry).collect();

        debug!(
            bucket,
            marker = ?marker,
            entries = entries.len(),
            truncated = resp.is_truncated().unwrap_or(false),
            "Listed page"
        );

        Ok(ListPage {
            entries,
            is_truncated: resp.is_truncated().unwrap_or(false),
            next_marker: resp.next_marker().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| TransferError::Get {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(Box::pin(body_stream(
            resp.body,
            bucket.to_string(),
            key.to_string(),
        )))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: PutBody,
    ) -> Result<PutResult> {
        let body = match body {
            PutBody::Bytes(bytes) => ByteStream::from(bytes),
            PutBody::File(path) => {
                ByteStream::from_path(&path)
                    .await
                    .map_err(|e| TransferError::LocalFile {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?
            }
        };

        let resp = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| TransferError::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(PutResult {
            etag: resp.e_tag().map(str::to_string),
            version_id: resp.version_id().map(str::to_string),
        })
    }

    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let presign_error = |reason: String| TransferError::Presign {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| presign_error(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| presign_error(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// [`StoreFactory`] building a fresh S3 client per resolved connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3StoreFactory;

impl S3StoreFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreFactory for S3StoreFactory {
    async fn connect(&self, connection: &ResolvedConnection) -> Result<Arc<dyn ObjectStore>> {
        let client = create_s3_client(connection).await?;
        Ok(Arc::new(S3Store::new(client)))
    }
}
