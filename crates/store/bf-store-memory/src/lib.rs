//! In-memory object store.
//!
//! [`MemoryStore`] implements [`ObjectStore`] with marker-based pagination
//! over sorted keys. It can add latency to listing calls and fail chosen
//! listing requests, which makes it the backend of choice for exercising the
//! poller's pagination, failure and serialization behaviour.

use async_trait::async_trait;
use bf_error::{BfError, Result, TransferError};
use bf_traits::{ListPage, ObjectBody, ObjectStore, PutBody, PutResult, StoreFactory};
use bf_types::{ObjectEntry, ResolvedConnection};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default number of keys per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const BODY_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    etag: String,
    last_modified: DateTime<Utc>,
}

/// In-memory [`ObjectStore`].
pub struct MemoryStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    page_size: usize,
    emit_next_marker: bool,
    list_latency: Option<Duration>,
    /// Absolute list call numbers (1-based) that fail
    failing_list_calls: Mutex<BTreeSet<usize>>,
    list_calls: AtomicUsize,
    lists_in_flight: AtomicUsize,
    max_lists_in_flight: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
            emit_next_marker: false,
            list_latency: None,
            failing_list_calls: Mutex::new(BTreeSet::new()),
            list_calls: AtomicUsize::new(0),
            lists_in_flight: AtomicUsize::new(0),
            max_lists_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of keys returned per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Return an explicit next marker on truncated pages.
    ///
    /// Off by default, like the v1 listing API without a delimiter, so
    /// callers must fall back to the last key of the page.
    pub fn with_next_marker(mut self, emit_next_marker: bool) -> Self {
        self.emit_next_marker = emit_next_marker;
        self
    }

    /// Delay every listing request.
    pub fn with_list_latency(mut self, latency: Duration) -> Self {
        self.list_latency = Some(latency);
        self
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.lock().entry(bucket.to_string()).or_default();
    }

    /// Store an object, creating the bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.store(bucket, key, data.into(), "application/octet-stream");
    }

    pub fn remove(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .lock()
            .get_mut(bucket)
            .is_some_and(|objects| objects.remove(key).is_some())
    }

    /// Sorted keys of a bucket.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Body and content type of a stored object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<(Bytes, String)> {
        self.buckets
            .lock()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| (o.data.clone(), o.content_type.clone()))
    }

    /// Make a future listing request fail.
    ///
    /// `calls_from_now` counts from the next request: `0` fails the very next
    /// one, `1` lets one succeed and fails the second.
    pub fn fail_list_call(&self, calls_from_now: usize) {
        let target = self.list_calls.load(Ordering::SeqCst) + calls_from_now + 1;
        self.failing_list_calls.lock().insert(target);
    }

    /// Total listing requests served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Highest number of listing requests observed running at once.
    pub fn max_lists_in_flight(&self) -> usize {
        self.max_lists_in_flight.load(Ordering::SeqCst)
    }

    fn store(&self, bucket: &str, key: &str, data: Bytes, content_type: &str) -> String {
        let etag = etag_for(&data);
        self.buckets.lock().entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                etag: etag.clone(),
                last_modified: Utc::now(),
            },
        );
        etag
    }

    fn page(&self, bucket: &str, marker: Option<&str>) -> Result<ListPage> {
        let buckets = self.buckets.lock();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| BfError::listing(bucket, "NoSuchBucket: The specified bucket does not exist"))?;

        let lower = match marker {
            Some(marker) => Bound::Excluded(marker.to_string()),
            None => Bound::Unbounded,
        };
        let mut remaining = objects.range((lower, Bound::Unbounded));

        let entries: Vec<ObjectEntry> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|(key, o)| {
                ObjectEntry::new(key.clone(), o.data.len() as u64)
                    .with_last_modified(o.last_modified)
                    .with_etag(o.etag.clone())
                    .with_storage_class("STANDARD")
            })
            .collect();
        let is_truncated = remaining.next().is_some();

        let next_marker = if is_truncated && self.emit_next_marker {
            entries.last().map(|e| e.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            entries,
            is_truncated,
            next_marker,
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, bucket: &str, marker: Option<&str>) -> Result<ListPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.lists_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_lists_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(latency) = self.list_latency {
            tokio::time::sleep(latency).await;
        }

        let result = if self.failing_list_calls.lock().remove(&call) {
            Err(BfError::listing(bucket, "injected failure: service unavailable"))
        } else {
            self.page(bucket, marker)
        };

        self.lists_in_flight.fetch_sub(1, Ordering::SeqCst);
        debug!(bucket, call, marker = ?marker, ok = result.is_ok(), "Memory list");
        result
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let (data, _) = self.object(bucket, key).ok_or_else(|| TransferError::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: "NoSuchKey: The specified key does not exist".to_string(),
        })?;

        let chunks: Vec<Result<Bytes>> = data
            .chunks(BODY_CHUNK_SIZE)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: PutBody,
    ) -> Result<PutResult> {
        if !self.buckets.lock().contains_key(bucket) {
            return Err(TransferError::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "NoSuchBucket: The specified bucket does not exist".to_string(),
            }
            .into());
        }

        let data = match body {
            PutBody::Bytes(bytes) => bytes,
            PutBody::File(path) => tokio::fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|e| TransferError::LocalFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?,
        };

        let etag = self.store(bucket, key, data, content_type);
        Ok(PutResult {
            etag: Some(etag),
            version_id: None,
        })
    }

    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "memory://{bucket}/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }
}

fn etag_for(data: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("\"{:016x}\"", hasher.finish())
}

/// [`StoreFactory`] handing out one shared [`MemoryStore`].
///
/// Every resolved connection it is asked for is recorded, so tests can check
/// which region, endpoint and credentials an adapter would have used.
pub struct MemoryStoreFactory {
    store: Arc<MemoryStore>,
    connections: Mutex<Vec<ResolvedConnection>>,
}

impl MemoryStoreFactory {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Connections requested so far, oldest first.
    pub fn connections(&self) -> Vec<ResolvedConnection> {
        self.connections.lock().clone()
    }
}

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    async fn connect(&self, connection: &ResolvedConnection) -> Result<Arc<dyn ObjectStore>> {
        self.connections.lock().push(connection.clone());
        Ok(self.store.clone())
    }
}
