//! Status reporters.

use bf_error::BfError;
use bf_traits::StatusReporter;
use bf_types::{Message, NodeStatus};
use parking_lot::Mutex;
use tracing::{error, info, warn};

/// Writes status changes and errors as structured log lines.
#[derive(Debug, Clone)]
pub struct TracingStatusReporter {
    node: String,
}

impl TracingStatusReporter {
    /// `node` names the adapter in every log line.
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

impl StatusReporter for TracingStatusReporter {
    fn status(&self, status: NodeStatus) {
        match &status {
            NodeStatus::Error { message } | NodeStatus::Failed { message } => {
                warn!(node = %self.node, status = ?status, message = %message, "Status changed");
            }
            NodeStatus::Clear => {}
            _ => info!(node = %self.node, status = %status, "Status changed"),
        }
    }

    fn error(&self, err: &BfError, msg: Option<&Message>) {
        match msg {
            Some(msg) => error!(
                node = %self.node,
                category = ?err.category(),
                error = %err,
                message = %msg.to_json(),
                "Operation failed"
            ),
            None => error!(
                node = %self.node,
                category = ?err.category(),
                error = %err,
                "Operation failed"
            ),
        }
    }
}

/// Keeps every reported status and error in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    statuses: Mutex<Vec<NodeStatus>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<NodeStatus> {
        self.statuses.lock().clone()
    }

    pub fn last_status(&self) -> Option<NodeStatus> {
        self.statuses.lock().last().cloned()
    }

    /// Display text of every reported error.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl StatusReporter for RecordingReporter {
    fn status(&self, status: NodeStatus) {
        self.statuses.lock().push(status);
    }

    fn error(&self, err: &BfError, _msg: Option<&Message>) {
        self.errors.lock().push(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter() {
        let reporter = RecordingReporter::new();
        reporter.status(NodeStatus::Initializing);
        reporter.status(NodeStatus::Monitoring { files: 2 });
        reporter.error(&BfError::config("Region is missing"), None);

        assert_eq!(reporter.statuses().len(), 2);
        assert_eq!(
            reporter.last_status(),
            Some(NodeStatus::Monitoring { files: 2 })
        );
        assert_eq!(
            reporter.errors(),
            vec!["Configuration error: Region is missing".to_string()]
        );
    }

    #[test]
    fn test_tracing_reporter_accepts_everything() {
        let reporter = TracingStatusReporter::new("watch");
        reporter.status(NodeStatus::CheckingForChanges);
        reporter.status(NodeStatus::Clear);
        reporter.status(NodeStatus::Error {
            message: "boom".to_string(),
        });
        reporter.error(
            &BfError::listing("media", "timeout"),
            Some(&Message::new().with_field("bucket", "media")),
        );
    }
}
