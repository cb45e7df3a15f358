//! Shared utilities for bucketflow CLI binaries.

pub mod args;
pub mod logging;

pub use args::{LogLevel, parse_positive_u64};
pub use logging::init_logging;
