//! Main execution logic for bf-watch CLI.

use anyhow::{Context, Result};
use bf_handlers::{
    DownloadConfig, DownloadHandler, HandlerContext, SignConfig, SignHandler, TargetConfig,
    UploadConfig, UploadHandler,
};
use bf_output::{StdoutSink, TracingStatusReporter};
use bf_poller::{BucketPoller, PollStats, PollerConfig, PollerService};
use bf_store_s3::S3StoreFactory;
use bf_traits::{MessageSink, StoreFactory, Triggerable};
use bf_types::{Message, ParameterSource, StoreConnectionConfig};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::args::{Cli, Command, ConnectionArgs, GetArgs, PutArgs, SignArgs, WatchArgs};

/// Execute the selected subcommand.
///
/// Returns the stats of the last poll cycle when watching with `--once`.
pub async fn execute(cli: Cli) -> Result<Option<PollStats>> {
    let connection = connection_config(&cli.connection);
    let sink: Arc<dyn MessageSink> = Arc::new(StdoutSink::new(cli.output_format.into()));
    let factory: Arc<dyn StoreFactory> = Arc::new(S3StoreFactory::new());

    match cli.command {
        Command::Watch(args) => watch(args, connection, factory, sink).await,
        Command::Get(args) => {
            get(args, connection, handler_context(factory, sink, "get")).await?;
            Ok(None)
        }
        Command::Put(args) => {
            put(args, connection, handler_context(factory, sink, "put")).await?;
            Ok(None)
        }
        Command::Sign(args) => {
            sign(args, connection, handler_context(factory, sink, "sign")).await?;
            Ok(None)
        }
    }
}

/// Build a connection config from CLI arguments.
fn connection_config(args: &ConnectionArgs) -> StoreConnectionConfig {
    let mut config = StoreConnectionConfig::new(ParameterSource::literal(&args.region))
        .with_force_path_style(args.force_path_style)
        .with_skip_tls_verify(args.skip_tls_verify)
        .with_managed_identity(args.managed_identity);

    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(ParameterSource::literal(endpoint));
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        config = config.with_credentials(
            ParameterSource::literal(access_key),
            ParameterSource::literal(secret_key),
        );
    }

    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    if let Some(max_attempts) = args.max_attempts {
        config = config.with_max_attempts(max_attempts);
    }

    config
}

fn handler_context(
    factory: Arc<dyn StoreFactory>,
    sink: Arc<dyn MessageSink>,
    node: &str,
) -> HandlerContext {
    HandlerContext::new(factory, sink).with_reporter(Arc::new(TracingStatusReporter::new(node)))
}

fn target(bucket: &str, key: &str, connection: StoreConnectionConfig) -> TargetConfig {
    TargetConfig::new()
        .with_bucket(ParameterSource::literal(bucket))
        .with_filename(ParameterSource::literal(key))
        .with_connection(connection)
}

async fn watch(
    args: WatchArgs,
    connection: StoreConnectionConfig,
    factory: Arc<dyn StoreFactory>,
    sink: Arc<dyn MessageSink>,
) -> Result<Option<PollStats>> {
    let mut config = PollerConfig::new(ParameterSource::literal(&args.bucket))
        .with_polling_interval(Duration::from_secs(args.interval))
        .with_startup_delay(Duration::from_secs(args.startup_delay))
        .with_connection(connection);

    if let Some(pattern) = &args.pattern {
        config = config.with_file_pattern(pattern);
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid poller configuration: {}", e))?;

    let poller = Arc::new(
        BucketPoller::new(config, factory, sink)?
            .with_reporter(Arc::new(TracingStatusReporter::new("watch"))),
    );

    if args.once {
        return poll_once(&poller, &args).await.map(Some);
    }

    let service = PollerService::start(poller.clone());

    if args.stdin_triggers {
        tokio::select! {
            result = forward_stdin_triggers(poller) => {
                result?;
                info!("stdin closed, waiting for shutdown signal");
                shutdown_signal().await?;
            }
            result = shutdown_signal() => result?,
        }
    } else {
        shutdown_signal().await?;
    }

    info!("Shutting down");
    service.shutdown().await;

    Ok(None)
}

/// Seed a baseline, wait one interval and report the changes since.
async fn poll_once(poller: &BucketPoller, args: &WatchArgs) -> Result<PollStats> {
    tokio::time::sleep(Duration::from_secs(args.startup_delay)).await;

    let trigger = Message::new();
    let baseline = poller.poll(&trigger).await?;
    info!(
        bucket = %baseline.bucket,
        keys = baseline.stats.keys_retained,
        "Baseline taken"
    );

    tokio::time::sleep(Duration::from_secs(args.interval)).await;

    let outcome = poller.poll(&trigger).await?;
    Ok(outcome.stats)
}

/// Poll once per JSON message read from stdin.
async fn forward_stdin_triggers(poller: Arc<BucketPoller>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg = match serde_json::from_str(line).and_then(Message::from_json) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed trigger message");
                continue;
            }
        };

        // Failures are already reported by the poller
        if let Err(e) = poller.trigger(msg).await {
            debug!(error = %e, "Triggered poll failed");
        }
    }

    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")
}

async fn get(args: GetArgs, connection: StoreConnectionConfig, ctx: HandlerContext) -> Result<()> {
    let config = DownloadConfig::new(target(&args.bucket, &args.key, connection))
        .with_return_buffer(!args.text);

    DownloadHandler::new(config, ctx).trigger(Message::new()).await?;
    Ok(())
}

async fn put(args: PutArgs, connection: StoreConnectionConfig, ctx: HandlerContext) -> Result<()> {
    let mut config = UploadConfig::new(target(&args.bucket, &args.key, connection));
    let mut msg = Message::new();

    match &args.file {
        Some(path) => {
            config = config.with_local_filename(ParameterSource::literal(path.to_string_lossy()));
        }
        None => {
            let mut data = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut data)
                .await
                .context("failed to read stdin")?;
            debug!(bytes = data.len(), "Read upload body from stdin");
            msg.set_payload(Bytes::from(data));
        }
    }

    if let Some(content_type) = &args.content_type {
        msg.set("contentType", content_type.as_str());
    }

    UploadHandler::new(config, ctx).trigger(msg).await?;
    Ok(())
}

async fn sign(args: SignArgs, connection: StoreConnectionConfig, ctx: HandlerContext) -> Result<()> {
    let config = SignConfig::new(target(&args.bucket, &args.key, connection))
        .with_url_expiration(args.expires);

    SignHandler::new(config, ctx)?.trigger(Message::new()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_connection_config_from_args() {
        let cli = Cli::try_parse_from([
            "bf-watch",
            "--region",
            "eu-central-1",
            "--endpoint",
            "localhost:9000",
            "--force-path-style",
            "--access-key",
            "AKIA",
            "--secret-key",
            "secret",
            "--timeout",
            "10",
            "get",
            "-b",
            "media",
            "-k",
            "a.txt",
        ])
        .unwrap();

        let config = connection_config(&cli.connection);
        assert_eq!(config.region, ParameterSource::literal("eu-central-1"));
        assert_eq!(config.endpoint, Some(ParameterSource::literal("localhost:9000")));
        assert!(config.force_path_style);
        assert_eq!(config.access_key_id, Some(ParameterSource::literal("AKIA")));
        assert_eq!(config.timeout_secs, Some(10));
        assert_eq!(config.max_attempts, None);
    }

    #[test]
    fn test_target_uses_literals() {
        let target = target("media", "a/b.txt", StoreConnectionConfig::default());
        assert_eq!(target.bucket, Some(ParameterSource::literal("media")));
        assert_eq!(target.filename, Some(ParameterSource::literal("a/b.txt")));
    }
}
