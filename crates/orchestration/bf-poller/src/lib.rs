//! bf-poller - bucket change detection for bucketflow.
//!
//! A [`BucketPoller`] lists a bucket to exhaustion, compares the key set with
//! the one retained from its previous successful cycle and emits one message
//! per added or deleted key. The first successful cycle only records the
//! baseline.
//!
//! - [`PatternFilter`] - Glob filter applied to full keys before diffing
//! - [`list_pages`] / [`list_all`] - Marker-chained listing
//! - [`diff`] - Add/delete computation with stable ordering
//! - [`PollerService`] - Startup delay plus a fixed polling interval
//!
//! # Example
//!
//! ```ignore
//! use bf_poller::{BucketPoller, PollerConfig, PollerService};
//! use bf_types::ParameterSource;
//!
//! let config = PollerConfig::new(ParameterSource::literal("incoming"))
//!     .with_file_pattern("*.csv");
//! let poller = Arc::new(BucketPoller::new(config, factory, sink)?);
//!
//! let service = PollerService::start(poller.clone());
//! // ... later
//! service.shutdown().await;
//! ```

pub mod config;
pub mod diff;
pub mod filter;
pub mod list;
pub mod poller;
pub mod service;
pub mod snapshot;
pub mod stats;

pub use config::{DEFAULT_POLLING_INTERVAL, PollerConfig};
pub use diff::diff;
pub use filter::PatternFilter;
pub use list::{Listing, list_all, list_pages};
pub use poller::{BucketPoller, PollOutcome, PollerState};
pub use service::PollerService;
pub use snapshot::BucketSnapshot;
pub use stats::PollStats;
