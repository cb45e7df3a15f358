//! Object-store client traits and related types.

use async_trait::async_trait;
use bf_error::Result;
use bf_types::{ObjectEntry, ResolvedConnection};
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Body of a fetched object, as a stream of chunks.
pub type ObjectBody = BoxStream<'static, Result<Bytes>>;

/// One page of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    /// Entries in store order
    pub entries: Vec<ObjectEntry>,

    /// True if more pages follow
    pub is_truncated: bool,

    /// Marker to pass to the next request, when the store supplies one
    pub next_marker: Option<String>,
}

impl ListPage {
    /// Marker for the following request.
    ///
    /// Falls back to the last key of this page when the store did not
    /// return an explicit marker.
    pub fn continuation_marker(&self) -> Option<&str> {
        self.next_marker
            .as_deref()
            .or_else(|| self.entries.last().map(|e| e.key.as_str()))
    }
}

/// Upload body source.
#[derive(Debug, Clone, PartialEq)]
pub enum PutBody {
    /// Stream a local file
    File(PathBuf),

    /// In-memory bytes
    Bytes(Bytes),
}

/// Metadata returned by a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResult {
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(rename = "VersionId", default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Trait for object-store clients.
///
/// Implementations include:
/// - S3 via the AWS SDK (production)
/// - In-memory store (testing/development)
///
/// Retry and timeout behaviour belongs to the implementation's underlying
/// client and is configured when the client is built.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of objects, starting after `marker`.
    async fn list_objects(&self, bucket: &str, marker: Option<&str>) -> Result<ListPage>;

    /// Fetches an object body.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody>;

    /// Uploads an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: PutBody,
    ) -> Result<PutResult>;

    /// Creates a time-limited GET URL for one object.
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

/// Builds store clients bound to one resolved connection.
///
/// Adapters resolve their connection settings per invocation, so clients are
/// requested from the factory each time rather than held for the adapter's
/// lifetime.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    async fn connect(&self, connection: &ResolvedConnection) -> Result<Arc<dyn ObjectStore>>;
}

/// Buffer a whole object body in memory.
pub async fn read_body(body: ObjectBody) -> Result<Bytes> {
    let buffer = body
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await?;
    Ok(buffer.freeze())
}
