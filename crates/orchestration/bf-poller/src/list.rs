//! Marker-chained bucket listing.

use async_stream::try_stream;
use bf_error::{BfError, Result};
use bf_traits::{ListPage, ObjectStore};
use bf_types::ObjectEntry;
use futures::{Stream, StreamExt, pin_mut};
use tracing::debug;

/// A complete bucket listing.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Entries of every page, in listing order
    pub entries: Vec<ObjectEntry>,

    /// Number of pages requested
    pub pages: usize,
}

/// List a bucket page by page.
///
/// The marker is carried forward until a page reports it is not truncated.
/// When the store does not hand out a next marker, the last key of the page
/// is used. A truncated page without a usable marker, or a marker that does
/// not move forward, ends the stream with a listing error.
pub fn list_pages<'a>(
    store: &'a dyn ObjectStore,
    bucket: &'a str,
) -> impl Stream<Item = Result<ListPage>> + Send + 'a {
    try_stream! {
        let mut marker: Option<String> = None;

        loop {
            let page = store.list_objects(bucket, marker.as_deref()).await?;

            debug!(
                bucket,
                marker = ?marker,
                entries = page.entries.len(),
                truncated = page.is_truncated,
                "Fetched listing page"
            );

            let next = if page.is_truncated {
                Some(next_marker(bucket, &page, marker.as_deref())?)
            } else {
                None
            };

            yield page;

            match next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
    }
}

fn next_marker(bucket: &str, page: &ListPage, previous: Option<&str>) -> Result<String> {
    let next = page.continuation_marker().ok_or_else(|| {
        BfError::listing(bucket, "truncated listing page carried no continuation marker")
    })?;

    // Keys are listed in ascending order, so a valid marker always grows
    if previous.is_some_and(|prev| next <= prev) {
        return Err(BfError::listing(
            bucket,
            format!("listing marker did not advance past '{next}'"),
        ));
    }

    Ok(next.to_string())
}

/// List a bucket to exhaustion.
///
/// Either every page is returned or the first failure is; a partial listing
/// is never produced. Each poll cycle diffs against this result.
pub async fn list_all(store: &dyn ObjectStore, bucket: &str) -> Result<Listing> {
    let stream = list_pages(store, bucket);
    pin_mut!(stream);

    let mut listing = Listing::default();
    while let Some(page) = stream.next().await {
        let page = page?;
        listing.pages += 1;
        listing.entries.extend(page.entries);
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bf_store_memory::MemoryStore;
    use bf_traits::{ObjectBody, PutBody, PutResult};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Returns prepared pages in order and records the markers it was given.
    struct ScriptedStore {
        pages: Mutex<VecDeque<ListPage>>,
        markers: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedStore {
        fn new(pages: Vec<ListPage>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                markers: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for ScriptedStore {
        async fn list_objects(&self, bucket: &str, marker: Option<&str>) -> Result<ListPage> {
            self.markers.lock().push(marker.map(str::to_string));
            self.pages
                .lock()
                .pop_front()
                .ok_or_else(|| BfError::listing(bucket, "script exhausted"))
        }

        async fn get_object(&self, _bucket: &str, _key: &str) -> Result<ObjectBody> {
            Err(BfError::config("not scripted"))
        }

        async fn put_object(
            &self,
            _bucket: &str,
            _key: &str,
            _content_type: &str,
            _body: PutBody,
        ) -> Result<PutResult> {
            Err(BfError::config("not scripted"))
        }

        async fn presign_get(&self, _bucket: &str, _key: &str, _expires_in: Duration) -> Result<String> {
            Err(BfError::config("not scripted"))
        }
    }

    fn page(keys: &[&str], is_truncated: bool, next_marker: Option<&str>) -> ListPage {
        ListPage {
            entries: keys.iter().map(|k| ObjectEntry::new(*k, 1)).collect(),
            is_truncated,
            next_marker: next_marker.map(str::to_string),
        }
    }

    fn keys(listing: &Listing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_three_pages_are_concatenated() {
        let store = MemoryStore::new().with_page_size(2);
        for key in ["a", "b", "c", "d", "e", "f"] {
            store.insert("bucket", key, "x");
        }

        let listing = list_all(&store, "bucket").await.unwrap();
        assert_eq!(listing.pages, 3);
        assert_eq!(keys(&listing), vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_explicit_next_marker_is_used() {
        let store = ScriptedStore::new(vec![
            page(&["a", "b"], true, Some("b")),
            page(&["c"], false, None),
        ]);

        let listing = list_all(&store, "bucket").await.unwrap();
        assert_eq!(keys(&listing), vec!["a", "b", "c"]);
        assert_eq!(
            *store.markers.lock(),
            vec![None, Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_last_key_is_fallback_marker() {
        let store = ScriptedStore::new(vec![
            page(&["a", "b"], true, None),
            page(&["c"], false, None),
        ]);

        list_all(&store, "bucket").await.unwrap();
        assert_eq!(
            *store.markers.lock(),
            vec![None, Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_truncated_page_without_marker_fails() {
        let store = ScriptedStore::new(vec![page(&[], true, None)]);

        let err = list_all(&store, "bucket").await.unwrap_err();
        assert!(matches!(err, BfError::Listing { .. }));
        assert!(err.to_string().contains("no continuation marker"));
    }

    #[tokio::test]
    async fn test_marker_must_advance() {
        let store = ScriptedStore::new(vec![
            page(&["a", "b"], true, None),
            page(&["b"], true, None),
        ]);

        let err = list_all(&store, "bucket").await.unwrap_err();
        assert!(err.to_string().contains("did not advance"));
    }

    #[tokio::test]
    async fn test_failure_on_second_page_fails_listing() {
        let store = MemoryStore::new().with_page_size(2);
        for key in ["a", "b", "c", "d"] {
            store.insert("bucket", key, "x");
        }
        store.fail_list_call(1);

        let err = list_all(&store, "bucket").await.unwrap_err();
        assert!(matches!(err, BfError::Listing { .. }));
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_bucket() {
        let store = MemoryStore::new();
        store.create_bucket("empty");

        let listing = list_all(&store, "empty").await.unwrap();
        assert_eq!(listing.pages, 1);
        assert!(listing.entries.is_empty());
    }
}
