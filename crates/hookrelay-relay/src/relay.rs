// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The relay facade: submission API, flush cycle, and lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures::future::join_all;
use hookrelay_cache::build_cache;
use hookrelay_config::{CacheConfig, FailurePolicy, HookrelayConfig};
use hookrelay_core::{
    CacheBackend, ChannelId, DeliveryHooks, Destination, Directory, MessageDescriptor, NoopHooks,
    RelayError, SendRequest, Transport,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chunker::ChunkLimits;
use crate::components::wrap_in_action_rows;
use crate::executor::{DeliveryReport, Executor};
use crate::identity::IdentityPolicy;
use crate::merger::{DestinationGroup, merge};
use crate::queue::{PendingQueue, QueueEntry};
use crate::resolver::{CacheTtls, Resolver};
use crate::scheduler::FlushScheduler;

/// Default flush period.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(6000);

/// What happened to a submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Appended to the pending queue; goes out on the next flush.
    Queued,
    /// Discarded before queueing: empty payload or unresolvable channel.
    Dropped(RelayError),
    /// Immediate send: every chunk was accepted.
    Delivered(Vec<MessageDescriptor>),
    /// Immediate send: a chunk failed and the rest were abandoned.
    Failed {
        delivered: Vec<MessageDescriptor>,
        error: RelayError,
    },
}

impl SubmitOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

/// A destination that failed during a flush.
#[derive(Debug)]
pub struct FailedDestination {
    pub channel_id: ChannelId,
    pub thread_id: Option<ChannelId>,
    pub error: RelayError,
}

/// Summary of one flush cycle.
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Entries drained from the queue.
    pub entries: usize,
    /// Distinct destinations after merging.
    pub destinations: usize,
    /// Messages the platform accepted.
    pub delivered: usize,
    /// Chunks abandoned after a failure on their destination.
    pub skipped_chunks: usize,
    /// Destinations never dispatched because an earlier one failed
    /// (`abort_flush` only).
    pub aborted: usize,
    pub failures: Vec<FailedDestination>,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    fn record(&mut self, destination: Destination, report: DeliveryReport) {
        self.delivered += report.delivered.len();
        self.skipped_chunks += report.skipped;
        if let Some(error) = report.error {
            self.failures.push(FailedDestination {
                channel_id: destination.channel_id,
                thread_id: destination.thread_id,
                error,
            });
        }
    }
}

/// Counters over the relay's lifetime.
#[derive(Debug, Default)]
pub struct RelayStats {
    queued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    flushes: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Submissions appended to the queue.
    pub queued: u64,
    /// Messages accepted by the platform.
    pub delivered: u64,
    /// Destination deliveries that failed.
    pub failed: u64,
    /// Submissions discarded before queueing.
    pub dropped: u64,
    /// Flush cycles that had something to send.
    pub flushes: u64,
}

impl RelayStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }

    fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }
}

/// State shared between the relay handle and its flush timer.
pub(crate) struct RelayInner {
    queue: PendingQueue,
    resolver: Arc<Resolver>,
    executor: Executor,
    cache: Arc<dyn CacheBackend>,
    identity: IdentityPolicy,
    failure_policy: FailurePolicy,
    stats: RelayStats,
    /// Held for a whole flush so cycles never overlap.
    flush_lock: Mutex<()>,
}

impl RelayInner {
    /// One timer tick: cache maintenance, then a flush.
    pub(crate) async fn tick(&self) {
        match self.cache.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "purged expired cache records"),
            Err(e) => warn!(error = %e, "cache maintenance failed"),
        }
        self.flush().await;
    }

    pub(crate) async fn flush(&self) -> FlushReport {
        let _guard = self.flush_lock.lock().await;

        let entries = self.queue.drain().await;
        if entries.is_empty() {
            return FlushReport::default();
        }

        let mut report = FlushReport {
            entries: entries.len(),
            ..FlushReport::default()
        };
        let groups = merge(entries);
        report.destinations = groups.len();
        RelayStats::add(&self.stats.flushes, 1);

        match self.failure_policy {
            FailurePolicy::Isolate => {
                let destinations: Vec<Destination> =
                    groups.iter().map(|g| g.destination.clone()).collect();
                let results =
                    join_all(groups.into_iter().map(|g| self.executor.deliver(g))).await;
                for (destination, result) in destinations.into_iter().zip(results) {
                    report.record(destination, result);
                }
            }
            FailurePolicy::AbortFlush => {
                let mut remaining = groups.len();
                for group in groups {
                    remaining -= 1;
                    let destination = group.destination.clone();
                    let result = self.executor.deliver(group).await;
                    let failed = !result.is_success();
                    report.record(destination, result);
                    if failed {
                        if remaining > 0 {
                            warn!(
                                abandoned = remaining,
                                "delivery failed, abandoning the rest of this flush"
                            );
                        }
                        report.aborted = remaining;
                        break;
                    }
                }
            }
        }

        RelayStats::add(&self.stats.delivered, report.delivered);
        RelayStats::add(&self.stats.failed, report.failures.len());
        info!(
            entries = report.entries,
            destinations = report.destinations,
            delivered = report.delivered,
            failed = report.failures.len(),
            "flush complete"
        );
        report
    }

    async fn submit(&self, request: SendRequest) -> SubmitOutcome {
        if request.is_empty() {
            debug!(channel = %request.channel_id, "dropping send with empty payload");
            return self.dropped(RelayError::EmptyPayload);
        }

        let destination = match self.resolver.resolve(&request.channel_id).await {
            Ok(destination) => destination,
            Err(e) => {
                debug!(channel = %request.channel_id, error = %e, "dropping send to unresolvable channel");
                return self.dropped(e);
            }
        };

        let SendRequest {
            text,
            blocks,
            components,
            attachments,
            identity,
            mentions,
            immediate,
            transform_components,
            ..
        } = request;

        let entry = QueueEntry {
            destination,
            text: text.filter(|t| !t.trim().is_empty()),
            blocks,
            components: if transform_components {
                wrap_in_action_rows(components)
            } else {
                components
            },
            attachments,
            identity: self.identity.apply(identity),
            mentions: mentions.unwrap_or_default(),
        };

        if !immediate {
            self.queue.push(entry).await;
            RelayStats::add(&self.stats.queued, 1);
            return SubmitOutcome::Queued;
        }

        let report = self.executor.deliver(DestinationGroup::from_entry(entry)).await;
        RelayStats::add(&self.stats.delivered, report.delivered.len());
        match report.error {
            None => SubmitOutcome::Delivered(report.delivered),
            Some(error) => {
                RelayStats::add(&self.stats.failed, 1);
                SubmitOutcome::Failed {
                    delivered: report.delivered,
                    error,
                }
            }
        }
    }

    fn dropped(&self, error: RelayError) -> SubmitOutcome {
        RelayStats::add(&self.stats.dropped, 1);
        SubmitOutcome::Dropped(error)
    }
}

/// Batching webhook relay.
///
/// Submissions are resolved and normalized up front, queued, and flushed on a
/// fixed period: the queue is drained, merged per destination, split into
/// platform-sized chunks, and dispatched. Immediate submissions skip the
/// queue.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use hookrelay_core::{Directory, SendRequest, Transport};
/// # async fn demo(directory: Arc<dyn Directory>, transport: Arc<dyn Transport>) -> Result<(), hookrelay_core::RelayError> {
/// use hookrelay_relay::Relay;
///
/// let relay = Relay::builder(directory, transport).build()?;
/// relay.start()?;
/// relay.submit(SendRequest::new("1234").text("deploy finished")).await;
/// relay.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct Relay {
    inner: Arc<RelayInner>,
    flush_interval: Duration,
    scheduler: StdMutex<Option<FlushScheduler>>,
}

impl Relay {
    pub fn builder(directory: Arc<dyn Directory>, transport: Arc<dyn Transport>) -> RelayBuilder {
        RelayBuilder::new(directory, transport)
    }

    /// Accepts a send request. Never fails; the outcome says what happened.
    pub async fn submit(&self, request: SendRequest) -> SubmitOutcome {
        self.inner.submit(request).await
    }

    /// Runs one flush cycle now.
    pub async fn flush(&self) -> FlushReport {
        self.inner.flush().await
    }

    /// Starts the flush timer. Fails if it is already running.
    pub fn start(&self) -> Result<(), RelayError> {
        let mut scheduler = self
            .scheduler
            .lock()
            .map_err(|_| RelayError::Internal("scheduler lock poisoned".into()))?;
        if scheduler.is_some() {
            return Err(RelayError::Internal("relay is already running".into()));
        }
        *scheduler = Some(FlushScheduler::spawn(self.inner.clone(), self.flush_interval));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false)
    }

    /// Stops the flush timer and drains whatever is still queued.
    pub async fn stop(&self) -> FlushReport {
        let scheduler = match self.scheduler.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
            info!("relay stopped, draining pending queue");
        }
        self.inner.flush().await
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub async fn pending(&self) -> usize {
        self.inner.queue.len().await
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        let scheduler = match self.scheduler.get_mut() {
            Ok(scheduler) => scheduler,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(scheduler) = scheduler.as_ref() {
            scheduler.cancel();
        }
    }
}

/// Builder for [`Relay`].
pub struct RelayBuilder {
    directory: Arc<dyn Directory>,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheBackend>>,
    cache_config: CacheConfig,
    hooks: Arc<dyn DeliveryHooks>,
    flush_interval: Duration,
    failure_policy: FailurePolicy,
    identity: IdentityPolicy,
    ttls: CacheTtls,
    limits: ChunkLimits,
}

impl RelayBuilder {
    pub fn new(directory: Arc<dyn Directory>, transport: Arc<dyn Transport>) -> Self {
        Self {
            directory,
            transport,
            cache: None,
            cache_config: CacheConfig::default(),
            hooks: Arc::new(NoopHooks),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            failure_policy: FailurePolicy::default(),
            identity: IdentityPolicy::default(),
            ttls: CacheTtls::default(),
            limits: ChunkLimits::default(),
        }
    }

    /// Applies the relay, cache, and identity sections of a loaded config.
    pub fn with_config(mut self, config: &HookrelayConfig) -> Self {
        self.flush_interval = Duration::from_millis(config.relay.flush_interval_ms);
        self.failure_policy = config.relay.failure_policy;
        self.identity = IdentityPolicy::from_config(&config.identity);
        self.ttls = CacheTtls::from_config(&config.cache);
        self.cache_config = config.cache.clone();
        self
    }

    /// Uses an explicit cache backend instead of building one from config.
    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DeliveryHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn identity(mut self, identity: IdentityPolicy) -> Self {
        self.identity = identity;
        self
    }

    pub fn cache_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn limits(mut self, limits: ChunkLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the relay. A zero flush interval is rejected.
    pub fn build(self) -> Result<Relay, RelayError> {
        if self.flush_interval.is_zero() {
            return Err(RelayError::Config(
                "flush interval must be greater than zero".into(),
            ));
        }

        let cache = match self.cache {
            Some(cache) => cache,
            None => build_cache(&self.cache_config)?,
        };
        let resolver = Arc::new(Resolver::new(cache.clone(), self.directory, self.ttls));
        let executor = Executor::new(self.transport, resolver.clone(), self.hooks, self.limits);

        Ok(Relay {
            inner: Arc::new(RelayInner {
                queue: PendingQueue::new(),
                resolver,
                executor,
                cache,
                identity: self.identity,
                failure_policy: self.failure_policy,
                stats: RelayStats::default(),
                flush_lock: Mutex::new(()),
            }),
            flush_interval: self.flush_interval,
            scheduler: StdMutex::new(None),
        })
    }
}
