//! Download, upload and sign handler integration tests using LocalStack.

use crate::common::LocalStackTestContext;
use bf_handlers::{
    DownloadConfig, DownloadHandler, HandlerContext, SignConfig, SignHandler, TargetConfig,
    UploadConfig, UploadHandler,
};
use bf_output::CollectingSink;
use bf_store_s3::S3StoreFactory;
use bf_traits::Triggerable;
use bf_types::{Message, ParameterSource, Payload};
use bytes::Bytes;
use std::sync::Arc;

fn context(sink: Arc<CollectingSink>) -> HandlerContext {
    HandlerContext::new(Arc::new(S3StoreFactory::new()), sink)
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_upload_then_download() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-handlers-bucket";
    ctx.create_bucket(bucket).await.unwrap();

    let target = TargetConfig::new()
        .with_bucket(ParameterSource::literal(bucket))
        .with_connection(ctx.connection());

    let sink = Arc::new(CollectingSink::new());
    let upload = UploadHandler::new(UploadConfig::new(target.clone()), context(sink.clone()));
    upload
        .trigger(
            Message::new()
                .with_payload("hello localstack")
                .with_field("filename", "docs/hello.txt")
                .with_field("contentType", "text/plain"),
        )
        .await
        .unwrap();

    let uploaded = sink.take();
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].get("s3Response").unwrap()["ETag"].is_string());
    assert_eq!(
        ctx.get_text(bucket, "docs/hello.txt").await.as_deref(),
        Some("hello localstack")
    );

    let download = DownloadHandler::new(DownloadConfig::new(target), context(sink.clone()));
    download
        .trigger(Message::new().with_field("filename", "docs/hello.txt"))
        .await
        .unwrap();

    let downloaded = sink.take();
    assert_eq!(downloaded.len(), 1);
    assert_eq!(
        downloaded[0].payload(),
        &Payload::Bytes(Bytes::from_static(b"hello localstack"))
    );
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_download_missing_object_fails() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-handlers-missing";
    ctx.create_bucket(bucket).await.unwrap();

    let sink = Arc::new(CollectingSink::new());
    let download = DownloadHandler::new(
        DownloadConfig::new(
            TargetConfig::new()
                .with_bucket(ParameterSource::literal(bucket))
                .with_connection(ctx.connection()),
        ),
        context(sink.clone()),
    );

    let result = download
        .trigger(Message::new().with_field("filename", "absent.txt"))
        .await;
    assert!(result.is_err());
    assert!(sink.is_empty());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_sign_produces_url() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "test-handlers-sign";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_text(bucket, "video.mp4", "frames").await.unwrap();

    let sink = Arc::new(CollectingSink::new());
    let sign = SignHandler::new(
        SignConfig::new(
            TargetConfig::new()
                .with_bucket(ParameterSource::literal(bucket))
                .with_connection(ctx.connection()),
        )
        .with_url_expiration(300),
        context(sink.clone()),
    )
    .unwrap();

    sign.trigger(Message::new().with_field("filename", "video.mp4"))
        .await
        .unwrap();

    let messages = sink.messages();
    let Payload::Text(url) = messages[0].payload() else {
        panic!("expected a text payload");
    };
    assert!(url.contains("video.mp4"));
    assert!(url.contains("X-Amz-Expires=300"));
}
