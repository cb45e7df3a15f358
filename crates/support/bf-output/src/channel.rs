//! In-process sinks.

use async_trait::async_trait;
use bf_error::{BfError, Result};
use bf_traits::MessageSink;
use bf_types::Message;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Forwards every emitted message into an unbounded tokio channel.
///
/// Emission fails once the receiving side has been dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Message>,
}

impl ChannelSink {
    /// Create a sink and the receiver its messages arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn emit(&self, msg: Message) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| BfError::Sink("receiver dropped".to_string()))
    }
}

/// Keeps every emitted message in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<Message>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages emitted so far.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Drain the collected messages.
    pub fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl MessageSink for CollectingSink {
    async fn emit(&self, msg: Message) -> Result<()> {
        self.messages.lock().push(msg);
        Ok(())
    }
}
