//! CLI argument definitions for bf-watch.

use bf_cli_common::{LogLevel, parse_positive_u64};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Watch an S3 bucket for added and deleted objects, or move single objects.
///
/// Emitted messages go to stdout (one JSON object per line by default);
/// logs go to stderr.
///
/// ## Examples
///
/// Poll every minute, emitting an event per added or deleted `.csv` key:
///   bf-watch watch -b incoming --pattern "**/*.csv" --interval 60
///
/// One-off diff against LocalStack:
///   bf-watch --endpoint http://localhost:4566 --force-path-style watch -b incoming --once
///
/// Download, upload and sign:
///   bf-watch get -b media -k docs/readme.txt --text
///   bf-watch put -b media -k docs/readme.txt --file ./readme.txt
///   bf-watch sign -b media -k video.mp4 --expires 3600
#[derive(Parser, Debug)]
#[command(name = "bf-watch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format for emitted messages
    #[arg(long, value_enum, default_value = "jsonl", global = true)]
    pub output_format: OutputFormatArg,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll a bucket and emit one message per added or deleted key
    Watch(WatchArgs),

    /// Download one object and emit it as the message payload
    Get(GetArgs),

    /// Upload a local file, or stdin, as one object
    Put(PutArgs),

    /// Emit a pre-signed GET URL for one object
    Sign(SignArgs),
}

/// Store connection options.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1", global = true)]
    pub region: String,

    /// Custom S3 endpoint URL (MinIO, LocalStack)
    #[arg(long, env = "BF_S3_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Use path-style addressing (endpoint/bucket/key)
    #[arg(long, env = "BF_S3_FORCE_PATH_STYLE", global = true)]
    pub force_path_style: bool,

    /// Talk to the custom endpoint over plain http
    #[arg(long, global = true)]
    pub skip_tls_verify: bool,

    /// Use credentials from the environment, ignoring explicit keys
    #[arg(long, global = true)]
    pub managed_identity: bool,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", global = true, hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", global = true, hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Per-operation timeout in seconds
    #[arg(long, value_parser = parse_positive_u64, global = true)]
    pub timeout: Option<u64>,

    /// Maximum attempts per store call
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Bucket to watch
    #[arg(short, long, env = "BF_S3_BUCKET")]
    pub bucket: String,

    /// Glob matched against full keys (e.g. "logs/**/*.gz")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Seconds between polls
    #[arg(long, default_value = "900", value_parser = parse_positive_u64)]
    pub interval: u64,

    /// Seconds to wait before the first poll
    #[arg(long, default_value = "0")]
    pub startup_delay: u64,

    /// Take a baseline, poll again after one interval, then exit
    #[arg(long)]
    pub once: bool,

    /// Also poll whenever a JSON message arrives on stdin (one per line)
    #[arg(long, conflicts_with = "once")]
    pub stdin_triggers: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Bucket name
    #[arg(short, long, env = "BF_S3_BUCKET")]
    pub bucket: String,

    /// Object key
    #[arg(short, long)]
    pub key: String,

    /// Decode the body as UTF-8 text instead of emitting base64
    #[arg(long)]
    pub text: bool,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Bucket name
    #[arg(short, long, env = "BF_S3_BUCKET")]
    pub bucket: String,

    /// Object key
    #[arg(short, long)]
    pub key: String,

    /// Local file to upload; stdin is read when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Content type stored with the object
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Bucket name
    #[arg(short, long, env = "BF_S3_BUCKET")]
    pub bucket: String,

    /// Object key
    #[arg(short, long)]
    pub key: String,

    /// URL lifetime in seconds
    #[arg(long, default_value = "60", value_parser = parse_positive_u64)]
    pub expires: u64,
}

/// Output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one JSON object per line)
    Jsonl,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputFormatArg> for bf_output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Jsonl => bf_output::OutputFormat::Jsonl,
            OutputFormatArg::Json => bf_output::OutputFormat::Json,
        }
    }
}
