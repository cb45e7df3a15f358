//! Outbound adapters for bucketflow.
//!
//! This module provides [`MessageSink`](bf_traits::MessageSink) and
//! [`StatusReporter`](bf_traits::StatusReporter) implementations:
//! - [`StdoutSink`] - Writes messages to stdout as JSON or JSONL
//! - [`ChannelSink`] - Forwards messages into a tokio channel
//! - [`CollectingSink`] - Keeps messages in memory
//! - [`TracingStatusReporter`] - Turns status changes into log lines
//! - [`RecordingReporter`] - Keeps statuses and errors in memory

mod channel;
mod reporter;
mod stdout;

pub use channel::{ChannelSink, CollectingSink};
pub use reporter::{RecordingReporter, TracingStatusReporter};
pub use stdout::{OutputFormat, StdoutSink};
