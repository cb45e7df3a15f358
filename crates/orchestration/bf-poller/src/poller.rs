//! Bucket poller implementation.

use async_trait::async_trait;
use bf_error::{BfError, ErrorCategory, Result};
use bf_resolver::{ParameterResolver, resolve_bucket, resolve_connection};
use bf_traits::{MessageSink, NoopReporter, ObjectStore, StatusReporter, StoreFactory, Triggerable};
use bf_types::{ChangeEvent, ChangeKind, Message, NodeStatus, ObjectEntry, ResolvedConnection};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::PollerConfig;
use crate::diff::diff;
use crate::filter::PatternFilter;
use crate::list::list_all;
use crate::snapshot::BucketSnapshot;
use crate::stats::PollStats;

/// Lifecycle state of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// No cycle has completed yet
    Uninitialized,
    /// A cycle is running
    Listing,
    /// The last cycle succeeded
    Idle,
    /// The last cycle failed; the next one starts over from the retained snapshot
    Error,
}

/// Result of one successful poll cycle.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Bucket that was listed
    pub bucket: String,

    /// True when this cycle only recorded the baseline
    pub seeded: bool,

    /// Changes found, in emission order
    pub events: Vec<ChangeEvent>,

    pub stats: PollStats,
}

struct PollerInner {
    snapshot: Option<BucketSnapshot>,
}

/// Detects added and deleted keys in a bucket.
///
/// Every cycle resolves the bucket and connection afresh from the trigger
/// message, lists the whole bucket, diffs the filtered key set against the
/// snapshot from the last successful cycle and emits one message per change.
/// Cycles are serialized: a trigger arriving mid-cycle waits for it to finish.
///
/// One snapshot is retained per poller, not per bucket. When a trigger
/// switches the bucket (see [`BucketPrecedence`](bf_types::BucketPrecedence)),
/// the new bucket is diffed against the previous bucket's keys and then
/// becomes the baseline.
pub struct BucketPoller {
    config: PollerConfig,
    filter: Option<PatternFilter>,
    resolver: ParameterResolver,
    factory: Arc<dyn StoreFactory>,
    sink: Arc<dyn MessageSink>,
    reporter: Arc<dyn StatusReporter>,
    inner: Mutex<PollerInner>,
    state: parking_lot::Mutex<PollerState>,
}

impl BucketPoller {
    /// Create a new poller.
    ///
    /// Returns a configuration error if the configuration does not validate.
    pub fn new(
        config: PollerConfig,
        factory: Arc<dyn StoreFactory>,
        sink: Arc<dyn MessageSink>,
    ) -> Result<Self> {
        config.validate().map_err(BfError::Config)?;
        let filter = config.pattern().map(PatternFilter::new).transpose()?;

        Ok(Self {
            config,
            filter,
            resolver: ParameterResolver::default(),
            factory,
            sink,
            reporter: Arc::new(NoopReporter),
            inner: Mutex::new(PollerInner { snapshot: None }),
            state: parking_lot::Mutex::new(PollerState::Uninitialized),
        })
    }

    /// Use these flow and global stores for parameter resolution.
    pub fn with_resolver(mut self, resolver: ParameterResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Arc<dyn StatusReporter> {
        &self.reporter
    }

    pub fn state(&self) -> PollerState {
        *self.state.lock()
    }

    /// Keys retained from the last successful cycle, in stored order.
    ///
    /// `None` until the first cycle succeeds. Waits for a running cycle.
    pub async fn snapshot_keys(&self) -> Option<Vec<String>> {
        let inner = self.inner.lock().await;
        inner.snapshot.as_ref().map(|s| s.keys().to_vec())
    }

    /// Run one poll cycle.
    ///
    /// A failed cycle is reported through the status reporter and leaves the
    /// retained snapshot untouched.
    pub async fn poll(&self, trigger: &Message) -> Result<PollOutcome> {
        let mut inner = self.inner.lock().await;

        self.set_state(PollerState::Listing);
        self.reporter.status(NodeStatus::CheckingForChanges);

        match self.run_cycle(&mut inner, trigger).await {
            Ok(outcome) => {
                self.set_state(PollerState::Idle);
                self.reporter.status(NodeStatus::Monitoring {
                    files: outcome.stats.keys_retained,
                });

                info!(
                    bucket = %outcome.bucket,
                    seeded = outcome.seeded,
                    pages = outcome.stats.pages,
                    keys_listed = outcome.stats.keys_listed,
                    keys_filtered = outcome.stats.keys_filtered,
                    files = outcome.stats.keys_retained,
                    adds = outcome.stats.adds,
                    deletes = outcome.stats.deletes,
                    emit_failures = outcome.stats.emit_failures,
                    "Poll cycle completed"
                );

                Ok(outcome)
            }
            Err(e) => {
                self.set_state(PollerState::Error);
                self.reporter.status(NodeStatus::Error {
                    message: e.to_string(),
                });
                self.reporter.error(&e, Some(trigger));

                match e.category() {
                    ErrorCategory::Transient => {
                        warn!(error = %e, "Poll cycle failed, retrying on the next cycle")
                    }
                    ErrorCategory::Permanent => {
                        error!(error = %e, "Poll cycle failed, check the configuration")
                    }
                }

                Err(e)
            }
        }
    }

    async fn run_cycle(&self, inner: &mut PollerInner, trigger: &Message) -> Result<PollOutcome> {
        let (bucket, connection) = self.resolve_target(trigger)?;
        let store = self.factory.connect(&connection).await?;

        let mut stats = PollStats::new();
        let current = self.list_filtered(store.as_ref(), &bucket, &mut stats).await?;

        let seeded = inner.snapshot.is_none();
        let events = match &inner.snapshot {
            Some(previous) => diff(previous, &current),
            None => Vec::new(),
        };

        for event in &events {
            match event.kind {
                ChangeKind::Add => stats.adds += 1,
                ChangeKind::Delete => stats.deletes += 1,
            }

            debug!(bucket = %bucket, key = %event.key, event = %event.kind, "Detected change");

            if let Err(e) = self.sink.emit(event.to_message(trigger, &bucket)).await {
                warn!(key = %event.key, error = %e, "Failed to emit change event");
                stats.record_emit_failure(format!("Emit failed for {}: {}", event.key, e));
            }
        }

        let snapshot = BucketSnapshot::from_entries(&current);
        stats.keys_retained = snapshot.len();
        inner.snapshot = Some(snapshot);

        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "Failed to flush sink");
            stats.errors.push(format!("Flush failed: {e}"));
        }

        stats.complete();

        Ok(PollOutcome {
            bucket,
            seeded,
            events,
            stats,
        })
    }

    /// Resolve bucket and connection for one cycle.
    fn resolve_target(&self, trigger: &Message) -> Result<(String, ResolvedConnection)> {
        let ctx = self.resolver.context(trigger);

        let bucket = resolve_bucket(self.config.bucket.as_ref(), self.config.bucket_precedence, &ctx)?
            .ok_or_else(|| BfError::config("No S3 bucket specified"))?;
        let connection = resolve_connection(&self.config.connection, &ctx)?;

        Ok((bucket, connection))
    }

    /// List every page and keep the entries that pass the filter.
    async fn list_filtered(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        stats: &mut PollStats,
    ) -> Result<Vec<ObjectEntry>> {
        let listing = list_all(store, bucket).await?;
        stats.record_listing(&listing);

        let Some(filter) = &self.filter else {
            return Ok(listing.entries);
        };

        let mut current = Vec::with_capacity(listing.entries.len());
        for entry in listing.entries {
            if filter.matches(&entry.key) {
                current.push(entry);
            } else {
                stats.record_filtered();
            }
        }

        Ok(current)
    }

    fn set_state(&self, state: PollerState) {
        *self.state.lock() = state;
    }
}

#[async_trait]
impl Triggerable for BucketPoller {
    async fn trigger(&self, msg: Message) -> Result<()> {
        self.poll(&msg).await.map(|_| ())
    }
}
