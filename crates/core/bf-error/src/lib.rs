//! Error types and classification for bucketflow.
//!
//! This crate provides:
//! - [`BfError`] - Top-level error enum shared by every adapter
//! - [`TransferError`] - Failures of single get/put/presign operations
//! - [`ErrorCategory`] for deciding whether a later attempt can succeed

use thiserror::Error;

/// Top-level error type for bucketflow.
#[derive(Error, Debug)]
pub enum BfError {
    /// Configuration errors (missing region, bucket, filename, bad pattern)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A parameter source lookup itself failed
    #[error("Failed to resolve value for type: {source_type}, value: {key}. Error: {reason}")]
    Resolution {
        source_type: String,
        key: String,
        reason: String,
    },

    /// Paginated listing failed; the current poll cycle is abandoned
    #[error("Listing of bucket '{bucket}' failed: {reason}")]
    Listing { bucket: String, reason: String },

    /// Object transfer errors (download, upload, signing)
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Delivering a message to the outbound sink failed
    #[error("Sink error: {0}")]
    Sink(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from single object operations.
#[derive(Error, Debug)]
pub enum TransferError {
    /// GetObject failed or its body could not be read
    #[error("Error downloading object {bucket}/{key}: {reason}")]
    Get {
        bucket: String,
        key: String,
        reason: String,
    },

    /// PutObject failed
    #[error("Error uploading file to {bucket}/{key}: {reason}")]
    Put {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Pre-signing a GetObject request failed
    #[error("Error generating signed URL for {bucket}/{key}: {reason}")]
    Presign {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The local file to upload could not be opened
    #[error("Error reading local file '{path}': {reason}")]
    LocalFile { path: String, reason: String },
}

/// Error classification.
///
/// The poller has no retry loop of its own: a transient failure is simply
/// attempted again on the next scheduled or triggered cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - the next cycle may succeed
    ///
    /// Examples: listing timeout, store 503
    Transient,

    /// Permanent error - nothing changes until configuration or input does
    ///
    /// Examples: missing bucket, malformed message path, access denied
    Permanent,
}

impl BfError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Shorthand for a listing error.
    pub fn listing(bucket: impl Into<String>, reason: impl ToString) -> Self {
        Self::Listing {
            bucket: bucket.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Permanent,
            Self::Resolution { .. } => ErrorCategory::Permanent,
            Self::Listing { .. } => ErrorCategory::Transient,
            Self::Transfer(e) => classify_transfer_error(e),
            Self::Sink(_) => ErrorCategory::Transient,
            Self::Other(_) => ErrorCategory::Transient,
        }
    }

    /// Returns true if a later attempt might succeed without any change.
    pub fn is_transient(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

fn classify_transfer_error(error: &TransferError) -> ErrorCategory {
    match error {
        TransferError::LocalFile { .. } => ErrorCategory::Permanent,
        TransferError::Get { reason, .. }
        | TransferError::Put { reason, .. }
        | TransferError::Presign { reason, .. } => {
            let reason = reason.to_lowercase();
            if reason.contains("nosuchkey")
                || reason.contains("nosuchbucket")
                || reason.contains("accessdenied")
                || reason.contains("403")
                || reason.contains("404")
            {
                ErrorCategory::Permanent
            } else {
                ErrorCategory::Transient
            }
        }
    }
}

/// Result type alias using BfError.
pub type Result<T> = std::result::Result<T, BfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_permanent() {
        let error = BfError::config("Region is missing in S3 configuration");
        assert_eq!(error.category(), ErrorCategory::Permanent);
        assert!(!error.is_transient());
    }

    #[test]
    fn test_listing_error_is_transient() {
        let error = BfError::listing("media", "connection reset");
        assert_eq!(error.category(), ErrorCategory::Transient);
        assert!(error.to_string().contains("media"));
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_resolution_error_display() {
        let error = BfError::Resolution {
            source_type: "msg".to_string(),
            key: "payload..bucket".to_string(),
            reason: "empty path segment".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("type: msg"));
        assert!(text.contains("value: payload..bucket"));
        assert!(text.contains("empty path segment"));
    }

    #[test]
    fn test_transfer_error_classification() {
        let missing = BfError::Transfer(TransferError::Get {
            bucket: "b".to_string(),
            key: "k".to_string(),
            reason: "NoSuchKey: The specified key does not exist".to_string(),
        });
        assert_eq!(missing.category(), ErrorCategory::Permanent);

        let timeout = BfError::Transfer(TransferError::Put {
            bucket: "b".to_string(),
            key: "k".to_string(),
            reason: "dispatch failure: timeout".to_string(),
        });
        assert_eq!(timeout.category(), ErrorCategory::Transient);

        let file = BfError::Transfer(TransferError::LocalFile {
            path: "/tmp/none".to_string(),
            reason: "No such file or directory".to_string(),
        });
        assert_eq!(file.category(), ErrorCategory::Permanent);
    }

    #[test]
    fn test_error_display() {
        let error = BfError::Transfer(TransferError::Presign {
            bucket: "bucket".to_string(),
            key: "file.csv".to_string(),
            reason: "expiry too long".to_string(),
        });
        assert!(error.to_string().contains("Error generating signed URL"));
    }
}
