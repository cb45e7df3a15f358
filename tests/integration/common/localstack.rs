//! LocalStack test context and utilities.

use aws_sdk_s3::Client as S3Client;
use bf_types::{ParameterSource, StoreConnectionConfig};

/// LocalStack test context providing a raw S3 client for fixtures.
pub struct LocalStackTestContext {
    pub s3: S3Client,
    pub endpoint: String,
    pub region: String,
}

impl LocalStackTestContext {
    /// Create a new LocalStack test context.
    ///
    /// Uses the `LOCALSTACK_ENDPOINT` environment variable if set,
    /// otherwise defaults to `http://localhost:4566`.
    pub async fn new() -> Self {
        let endpoint = std::env::var("LOCALSTACK_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4566".to_string());
        let region = "us-east-1".to_string();

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                "test", "test", None, None, "localstack",
            ))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Self {
            s3: S3Client::from_conf(s3_config),
            endpoint,
            region,
        }
    }

    /// Connection settings pointing the store adapter at LocalStack.
    pub fn connection(&self) -> StoreConnectionConfig {
        StoreConnectionConfig::new(ParameterSource::literal(&self.region))
            .with_endpoint(ParameterSource::literal(&self.endpoint))
            .with_force_path_style(true)
            .with_credentials(ParameterSource::literal("test"), ParameterSource::literal("test"))
    }

    /// Check if LocalStack is available and healthy.
    pub async fn is_available(&self) -> bool {
        // Fails quickly if LocalStack isn't running
        self.s3.list_buckets().send().await.is_ok()
    }

    /// Create an S3 bucket for testing, emptying it if it already exists.
    pub async fn create_bucket(&self, name: &str) -> Result<(), aws_sdk_s3::Error> {
        let buckets = self.s3.list_buckets().send().await?;
        let exists = buckets
            .buckets()
            .iter()
            .any(|b| b.name().unwrap_or_default() == name);

        if exists {
            for key in self.list_objects(name).await? {
                self.delete_object(name, &key).await?;
            }
        } else {
            self.s3.create_bucket().bucket(name).send().await?;
        }
        Ok(())
    }

    /// Upload a text object.
    pub async fn put_text(&self, bucket: &str, key: &str, data: &str) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.as_bytes().to_vec().into())
            .content_type("text/plain")
            .send()
            .await?;
        Ok(())
    }

    /// Read an object back as UTF-8 text.
    pub async fn get_text(&self, bucket: &str, key: &str) -> Option<String> {
        let output = self.s3.get_object().bucket(bucket).key(key).send().await.ok()?;
        let data = output.body.collect().await.ok()?.into_bytes();
        String::from_utf8(data.to_vec()).ok()
    }

    /// Delete an S3 object.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), aws_sdk_s3::Error> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    /// List every key in a bucket.
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, aws_sdk_s3::Error> {
        let result = self.s3.list_objects_v2().bucket(bucket).send().await?;
        Ok(result
            .contents()
            .iter()
            .filter_map(|o| o.key().map(String::from))
            .collect())
    }
}
