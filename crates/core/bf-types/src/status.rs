//! Lifecycle status reported by adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an adapter, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeStatus {
    Initializing,
    CheckingForChanges,
    Monitoring { files: usize },
    Uploading,
    /// No status shown
    Clear,
    Error { message: String },
    Failed { message: String },
}

impl NodeStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Failed { .. })
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::CheckingForChanges => write!(f, "checking for changes"),
            Self::Monitoring { files } => write!(f, "monitoring {files} files"),
            Self::Uploading => write!(f, "uploading"),
            Self::Clear => write!(f, ""),
            Self::Error { message } => write!(f, "error: {message}"),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}
