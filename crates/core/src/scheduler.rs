//! Delay scheduler abstraction.
//!
//! The sync coordinator schedules retry passes after an exponential-backoff
//! delay. Routing the delay through a trait keeps retry behavior inspectable
//! and testable without real waits: tests inject [`ManualScheduler`], which
//! records the requested delays and resolves immediately.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the calling task for a requested duration.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn delay(&self, duration: Duration);
}

/// Production scheduler backed by the tokio timer.
#[derive(Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Scheduler for tests - records requested delays and returns immediately.
#[derive(Default)]
pub struct ManualScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delay requested so far, in order.
    pub fn requested_delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn delay(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
