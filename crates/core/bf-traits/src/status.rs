//! Status reporting.

use bf_error::BfError;
use bf_types::{Message, NodeStatus};

/// Receives lifecycle states and errors.
///
/// Errors are passed together with the triggering message, when there is one,
/// so reporters can correlate them.
pub trait StatusReporter: Send + Sync {
    fn status(&self, status: NodeStatus);

    fn error(&self, error: &BfError, msg: Option<&Message>);
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl StatusReporter for NoopReporter {
    fn status(&self, _status: NodeStatus) {}

    fn error(&self, _error: &BfError, _msg: Option<&Message>) {}
}
