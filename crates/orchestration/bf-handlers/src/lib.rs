//! bf-handlers - single-shot request handlers for bucketflow.
//!
//! Each handler resolves its bucket, key and connection from the incoming
//! message, performs exactly one store operation and passes the message on.
//! Nothing is retained between invocations.
//!
//! - [`DownloadHandler`] - Fetch an object into the payload
//! - [`SignHandler`] - Put a pre-signed GET URL into the payload
//! - [`UploadHandler`] - Store a local file or the payload as an object

mod context;
mod download;
mod sign;
mod target;
mod upload;

pub use context::HandlerContext;
pub use download::{DownloadConfig, DownloadHandler};
pub use sign::{DEFAULT_URL_EXPIRATION_SECS, SignConfig, SignHandler};
pub use target::{Target, TargetConfig};
pub use upload::{DEFAULT_CONTENT_TYPE, UploadConfig, UploadHandler};
