//! Outbound messages and inbound triggers.

use async_trait::async_trait;
use bf_error::Result;
use bf_types::Message;

/// Receives messages emitted by an adapter.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver one message downstream.
    async fn emit(&self, msg: Message) -> Result<()>;

    /// Flush any buffered output.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Something that reacts to an inbound message.
///
/// The poller, and each request handler, implement this so a host runtime
/// can drive them uniformly.
#[async_trait]
pub trait Triggerable: Send + Sync {
    async fn trigger(&self, msg: Message) -> Result<()>;
}
