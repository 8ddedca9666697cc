//! Background sync coordinator.
//!
//! Owns the drain of the pending-sync queue. One coordinator instance runs
//! per process; its state machine is `Idle -> Syncing -> Idle` on the happy
//! path and `Syncing -> RetryScheduled -> Syncing` when a pass fails
//! outright.
//!
//! Invariants enforced here:
//! - at most one sync pass is active at a time; a trigger arriving mid-pass
//!   is a no-op (the queue is re-examined on the next trigger or tick)
//! - items are processed strictly sequentially, in
//!   (priority desc, queued_at asc) order, so drain order matches commit
//!   order
//! - an item failure only affects that item; the pass keeps going

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::backoff::ExponentialBackoff;
use crate::transport::SyncTransportTrait;
use tradebook_core::connectivity::ConnectivityMonitor;
use tradebook_core::constants::{
    SYNC_BASE_RETRY_DELAY_MS, SYNC_MAX_RETRY_DELAY_MS, SYNC_PERIODIC_INTERVAL_MS, SYNC_TAG_TRADES,
};
use tradebook_core::errors::{Error, Result};
use tradebook_core::events::{EventBus, SyncEvent};
use tradebook_core::scheduler::Scheduler;
use tradebook_core::sync::{
    NewPendingSyncItem, PendingSyncItem, PendingSyncRepositoryTrait, SyncOperation, SyncPriority,
    SyncTriggerRegistrarTrait, SyncTriggerSinkTrait,
};
use tradebook_core::trades::{Trade, TradeRepositoryTrait};
use tradebook_core::utils::Clock;

/// Coordinator configuration.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Seed delay for the pass-level retry backoff.
    pub base_retry_delay: Duration,
    /// Ceiling for the pass-level retry backoff.
    pub max_retry_delay: Duration,
    /// Interval of the periodic queue check.
    pub periodic_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_retry_delay: Duration::from_millis(SYNC_BASE_RETRY_DELAY_MS),
            max_retry_delay: Duration::from_millis(SYNC_MAX_RETRY_DELAY_MS),
            periodic_interval: Duration::from_millis(SYNC_PERIODIC_INTERVAL_MS),
        }
    }
}

/// Coordinator state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing in progress.
    Idle,
    /// A pass is draining the queue.
    Syncing,
    /// The last pass failed; a retry is scheduled.
    RetryScheduled,
}

/// Aggregate status surfaced to the UI.
///
/// The UI shows pending counts and in-progress state, not individual
/// operation outcomes.
#[derive(Debug, Clone)]
pub struct SyncStatusReport {
    pub phase: SyncPhase,
    pub pending: usize,
    pub failed: usize,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub next_retry_delay: Option<Duration>,
}

/// Collaborators injected into the coordinator.
pub struct SyncDeps {
    pub queue: Arc<dyn PendingSyncRepositoryTrait>,
    pub trades: Arc<dyn TradeRepositoryTrait>,
    pub transport: Arc<dyn SyncTransportTrait>,
    pub events: EventBus,
    pub connectivity: ConnectivityMonitor,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
    pub registrar: Arc<dyn SyncTriggerRegistrarTrait>,
}

struct CoordinatorState {
    phase: SyncPhase,
    last_attempt: Option<DateTime<Utc>>,
    backoff: ExponentialBackoff,
    next_retry_delay: Option<Duration>,
}

pub struct SyncCoordinator {
    deps: SyncDeps,
    config: SyncConfig,
    state: Mutex<CoordinatorState>,
    // Concurrency guard: try_lock makes a mid-pass trigger a no-op.
    pass_guard: tokio::sync::Mutex<()>,
    // Weak self-reference for spawning retry/periodic tasks from &self.
    self_ref: Mutex<Weak<SyncCoordinator>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    connectivity_sub: Mutex<Option<tradebook_core::events::Subscription>>,
}

impl SyncCoordinator {
    /// Create a coordinator and hook it to connectivity transitions.
    ///
    /// The returned handle owns the background tasks; call
    /// [`SyncCoordinator::shutdown`] to tear them down.
    pub fn create(deps: SyncDeps, config: SyncConfig) -> Arc<Self> {
        let backoff = ExponentialBackoff::new(config.base_retry_delay, config.max_retry_delay);
        let coordinator = Arc::new(Self {
            deps,
            config,
            state: Mutex::new(CoordinatorState {
                phase: SyncPhase::Idle,
                last_attempt: None,
                backoff,
                next_retry_delay: None,
            }),
            pass_guard: tokio::sync::Mutex::new(()),
            self_ref: Mutex::new(Weak::new()),
            tasks: Mutex::new(Vec::new()),
            connectivity_sub: Mutex::new(None),
        });

        *coordinator.self_ref.lock().unwrap() = Arc::downgrade(&coordinator);

        // Reconnecting is a sync trigger.
        let weak = Arc::downgrade(&coordinator);
        let subscription = coordinator.deps.events.subscribe(move |event| {
            if matches!(event, SyncEvent::Online) {
                if let Some(coordinator) = weak.upgrade() {
                    tokio::spawn(async move {
                        if let Err(err) = coordinator.sync_now().await {
                            warn!("Sync on reconnect failed: {}", err);
                        }
                    });
                }
            }
        });
        *coordinator.connectivity_sub.lock().unwrap() = Some(subscription);

        coordinator
    }

    /// Spawn the periodic queue check.
    ///
    /// Each tick triggers a pass only when online and the queue is
    /// non-empty.
    pub fn start_periodic(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let interval = self.config.periodic_interval;
        let scheduler = Arc::clone(&self.deps.scheduler);

        let handle = tokio::spawn(async move {
            loop {
                scheduler.delay(interval).await;
                let Some(coordinator) = weak.upgrade() else {
                    break;
                };
                if !coordinator.deps.connectivity.is_online() {
                    continue;
                }
                match coordinator.deps.queue.pending_count() {
                    Ok(0) => {}
                    Ok(_) => {
                        if let Err(err) = coordinator.sync_now().await {
                            warn!("Periodic sync failed: {}", err);
                        }
                    }
                    Err(err) => warn!("Periodic queue check failed: {}", err),
                }
            }
        });

        self.tasks.lock().unwrap().push(handle);
    }

    /// Stop background tasks and detach from connectivity events.
    ///
    /// Queued items stay in the store; a new coordinator picks them up.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.connectivity_sub.lock().unwrap().take();
        info!("Sync coordinator shut down");
    }

    /// Accept a mutation: local-first write, enqueue, then flush or defer.
    ///
    /// The write is persisted before anything else so a crashed tab never
    /// loses it. When online the queue is flushed immediately; when offline
    /// a deferred trigger is registered with the interception layer.
    pub async fn queue_operation(
        &self,
        operation: SyncOperation,
        payload: Value,
        priority: Option<SyncPriority>,
    ) -> Result<PendingSyncItem> {
        self.apply_local(operation, &payload).await?;

        let mut new_item = NewPendingSyncItem::new(operation, payload);
        if let Some(priority) = priority {
            new_item = new_item.with_priority(priority);
        }
        let item = self.deps.queue.enqueue(new_item).await?;

        self.deps.events.emit(&SyncEvent::OperationQueued {
            id: item.id,
            operation,
        });

        if self.deps.connectivity.is_online() {
            // The mutation is already accepted locally; a failing flush is
            // retried by the backoff machinery, never surfaced to the
            // caller.
            if let Err(err) = self.sync_now().await {
                warn!("Immediate flush after queueing failed: {}", err);
            }
        } else {
            self.deps.registrar.register_sync(SYNC_TAG_TRADES)?;
        }

        Ok(item)
    }

    /// Run a sync pass now, unless one is already active.
    ///
    /// Explicit manual-sync requests are idempotent no-ops while a pass
    /// runs; they neither queue up nor cancel the active pass.
    pub async fn sync_now(&self) -> Result<()> {
        let Ok(_guard) = self.pass_guard.try_lock() else {
            debug!("Sync trigger ignored: a pass is already active");
            return Ok(());
        };

        if !self.deps.connectivity.is_online() {
            debug!("Sync trigger ignored: offline");
            return Ok(());
        }

        {
            let mut state = self.state.lock().unwrap();
            state.phase = SyncPhase::Syncing;
            state.last_attempt = Some(self.deps.clock.now());
            state.next_retry_delay = None;
        }
        self.deps.events.emit(&SyncEvent::SyncStarted);

        match self.drain().await {
            Ok((processed, failed)) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.phase = SyncPhase::Idle;
                    state.backoff.reset();
                }
                self.deps
                    .events
                    .emit(&SyncEvent::SyncSuccess { processed, failed });

                if processed > 0 && self.deps.queue.pending_count()? == 0 {
                    self.deps.events.emit(&SyncEvent::PendingCleared);
                }
                Ok(())
            }
            Err(err) => {
                let delay = {
                    let mut state = self.state.lock().unwrap();
                    state.phase = SyncPhase::RetryScheduled;
                    let delay = state.backoff.next_delay();
                    state.next_retry_delay = Some(delay);
                    delay
                };
                warn!("Sync pass failed ({}); retrying in {:?}", err, delay);
                self.deps.events.emit(&SyncEvent::SyncError {
                    message: err.to_string(),
                });
                self.schedule_retry(delay);
                Err(err)
            }
        }
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> SyncPhase {
        self.state.lock().unwrap().phase
    }

    /// Current aggregate status.
    pub fn status(&self) -> Result<SyncStatusReport> {
        let state = self.state.lock().unwrap();
        Ok(SyncStatusReport {
            phase: state.phase,
            pending: self.deps.queue.pending_count()?,
            failed: self.deps.queue.failed()?.len(),
            last_attempt: state.last_attempt,
            consecutive_failures: state.backoff.consecutive_failures(),
            next_retry_delay: state.next_retry_delay,
        })
    }

    /// Drain the queue strictly sequentially in drain order.
    ///
    /// Returns `(processed, failed_items)`. Item-level failures increment
    /// the item's retry count and keep going; only storage-level failures
    /// abort the pass.
    async fn drain(&self) -> Result<(usize, usize)> {
        let items = self.deps.queue.pending()?;
        debug!("Sync pass draining {} item(s)", items.len());

        let mut processed = 0;
        let mut failed = 0;

        for item in items {
            // Await each remote call before starting the next one so commit
            // order follows drain order.
            match self.deps.transport.apply(&item).await {
                Ok(()) => {
                    self.deps.queue.remove(item.id).await?;
                    self.confirm_local(&item).await?;
                    processed += 1;
                }
                Err(err) => {
                    failed += 1;
                    warn!(
                        "Sync item {} ({}) failed: {}",
                        item.id,
                        item.operation.as_db_str(),
                        err
                    );
                    let retryable = self.deps.queue.increment_retry(item.id).await?;
                    if !retryable {
                        info!(
                            "Sync item {} exhausted its retries and was parked",
                            item.id
                        );
                        self.deps.events.emit(&SyncEvent::ItemFailed {
                            id: item.id,
                            operation: item.operation,
                        });
                    }
                }
            }
        }

        Ok((processed, failed))
    }

    /// Apply the optimistic local write backing a queued operation.
    async fn apply_local(&self, operation: SyncOperation, payload: &Value) -> Result<()> {
        match operation {
            SyncOperation::CreateTrade | SyncOperation::UpdateTrade => {
                let mut trade: Trade = serde_json::from_value(payload.clone())?;
                trade.synced = false;
                trade.last_modified = self.deps.clock.now();
                self.deps.trades.save(trade).await?;
            }
            SyncOperation::DeleteTrade => {
                let trade_id = payload.get("id").and_then(Value::as_str).ok_or_else(|| {
                    Error::Validation("delete payload has no trade id".to_string())
                })?;
                self.deps.trades.delete(trade_id).await?;
            }
        }
        Ok(())
    }

    /// Mark the local record synced after remote acknowledgment.
    async fn confirm_local(&self, item: &PendingSyncItem) -> Result<()> {
        match item.operation {
            SyncOperation::CreateTrade | SyncOperation::UpdateTrade => {
                if let Some(trade_id) = item.trade_id() {
                    self.deps.trades.mark_synced(trade_id).await?;
                }
            }
            // The local record is already gone.
            SyncOperation::DeleteTrade => {}
        }
        Ok(())
    }

    fn schedule_retry(&self, delay: Duration) {
        let weak = self.self_ref.lock().unwrap().clone();
        let scheduler = Arc::clone(&self.deps.scheduler);

        let handle = tokio::spawn(async move {
            scheduler.delay(delay).await;
            let Some(coordinator) = weak.upgrade() else {
                return;
            };
            if coordinator.deps.connectivity.is_online() {
                if let Err(err) = coordinator.sync_now().await {
                    warn!("Scheduled retry failed: {}", err);
                }
            }
            // If still offline, the next Online event re-triggers the pass.
        });

        self.tasks.lock().unwrap().push(handle);
    }
}

#[async_trait]
impl SyncTriggerSinkTrait for SyncCoordinator {
    async fn trigger_sync(&self, tag: &str) {
        if tag != SYNC_TAG_TRADES {
            debug!("Ignoring unknown sync tag '{}'", tag);
            return;
        }
        if let Err(err) = self.sync_now().await {
            warn!("Deferred sync trigger failed: {}", err);
        }
    }
}
