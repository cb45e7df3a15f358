//! Bucket poller integration tests using LocalStack.

use crate::common::LocalStackTestContext;
use bf_output::CollectingSink;
use bf_poller::{BucketPoller, PollerConfig};
use bf_store_s3::S3StoreFactory;
use bf_types::{Message, ParameterSource, Payload};
use std::sync::Arc;

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_poller_detects_added_and_deleted_keys() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-poller-bucket";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_text(bucket, "data/a.csv", "a").await.unwrap();
    ctx.put_text(bucket, "data/b.csv", "b").await.unwrap();
    ctx.put_text(bucket, "data/notes.txt", "n").await.unwrap();

    let config = PollerConfig::new(ParameterSource::literal(bucket))
        .with_file_pattern("data/*.csv")
        .with_connection(ctx.connection());
    let sink = Arc::new(CollectingSink::new());
    let poller = BucketPoller::new(config, Arc::new(S3StoreFactory::new()), sink.clone()).unwrap();

    let trigger = Message::new();
    let seed = poller.poll(&trigger).await.unwrap();
    assert!(seed.seeded);
    assert_eq!(seed.stats.keys_retained, 2);
    assert!(sink.is_empty());

    ctx.put_text(bucket, "data/c.csv", "c").await.unwrap();
    ctx.delete_object(bucket, "data/a.csv").await.unwrap();

    let outcome = poller.poll(&trigger).await.unwrap();
    assert_eq!(outcome.stats.adds, 1);
    assert_eq!(outcome.stats.deletes, 1);

    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].get_str("event"), Some("add"));
    assert_eq!(messages[0].payload(), &Payload::Text("data/c.csv".to_string()));
    assert_eq!(messages[0].get_str("file"), Some("c.csv"));
    assert_eq!(messages[0].get_str("bucket"), Some(bucket));
    assert_eq!(messages[1].get_str("event"), Some("delete"));
    assert_eq!(messages[1].payload(), &Payload::Text("data/a.csv".to_string()));

    let quiet = poller.poll(&trigger).await.unwrap();
    assert!(quiet.events.is_empty());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_poller_reports_missing_bucket() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let config = PollerConfig::new(ParameterSource::literal("bucketflow-does-not-exist"))
        .with_connection(ctx.connection());
    let sink = Arc::new(CollectingSink::new());
    let poller = BucketPoller::new(config, Arc::new(S3StoreFactory::new()), sink.clone()).unwrap();

    let err = poller.poll(&Message::new()).await.unwrap_err();
    assert!(err.is_transient());
    assert!(sink.is_empty());
    assert!(poller.snapshot_keys().await.is_none());
}
