//! Stdout sink for emitted messages.

use async_trait::async_trait;
use bf_error::{BfError, Result};
use bf_traits::MessageSink;
use bf_types::Message;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output format for stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON Lines format - one JSON object per line (default)
    #[default]
    Jsonl,

    /// Pretty-printed JSON
    Json,
}

/// Stdout sink.
///
/// JSONL output keeps one message per line, suitable for piping to tools
/// like `jq`. Binary payloads are written as base64 strings.
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn jsonl() -> Self {
        Self::new(OutputFormat::Jsonl)
    }

    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Serialize a message the way [`emit`](MessageSink::emit) would print it.
    pub fn render(&self, msg: &Message) -> Result<String> {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(msg),
            OutputFormat::Jsonl => serde_json::to_string(msg),
        };
        rendered.map_err(|e| BfError::Sink(format!("JSON serialization failed: {e}")))
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::jsonl()
    }
}

#[async_trait]
impl MessageSink for StdoutSink {
    async fn emit(&self, msg: Message) -> Result<()> {
        let output = self.render(&msg)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{output}")
            .map_err(|e| BfError::Sink(format!("Failed to write to stdout: {e}")))
    }

    async fn flush(&self) -> Result<()> {
        std::io::stdout()
            .flush()
            .map_err(|e| BfError::Sink(format!("Failed to flush stdout: {e}")))
    }
}
