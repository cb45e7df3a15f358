//! S3 client creation.

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use bf_error::Result;
use bf_types::{Credentials, ResolvedConnection};
use std::time::Duration;
use tracing::debug;

/// Name under which static credentials are registered with the SDK.
const CREDENTIALS_PROVIDER_NAME: &str = "bucketflow";

/// Endpoint URL the client should talk to.
///
/// With `skip_tls_verify` the endpoint is contacted over plain HTTP; an
/// endpoint without a scheme gets one.
pub fn effective_endpoint(connection: &ResolvedConnection) -> Option<String> {
    let endpoint = connection.endpoint.as_deref()?.trim();
    if endpoint.is_empty() {
        return None;
    }

    let endpoint = if connection.skip_tls_verify {
        match endpoint.strip_prefix("https://") {
            Some(rest) => format!("http://{rest}"),
            None if endpoint.starts_with("http://") => endpoint.to_string(),
            None => format!("http://{endpoint}"),
        }
    } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };

    Some(endpoint)
}

/// Create an S3 client bound to a resolved connection.
pub async fn create_s3_client(connection: &ResolvedConnection) -> Result<Client> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(connection.region.clone()));

    if let Some(endpoint) = effective_endpoint(connection) {
        loader = loader.endpoint_url(endpoint);
    }

    // Without static keys the SDK's default provider chain applies
    // (environment, profile, web identity, container and instance roles)
    if let Credentials::Static {
        access_key_id,
        secret_access_key,
    } = &connection.credentials
    {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(max_attempts) = connection.max_attempts {
        loader = loader.retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
    }

    if let Some(timeout_secs) = connection.timeout_secs {
        loader = loader.timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_secs(timeout_secs))
                .build(),
        );
    }

    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(connection.force_path_style)
        .build();

    debug!(
        region = %connection.region,
        endpoint = ?connection.endpoint,
        force_path_style = connection.force_path_style,
        static_credentials = connection.credentials.is_static(),
        "Created S3 client"
    );

    Ok(Client::from_conf(s3_config))
}
