use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use gameclub_common::Source;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

use crate::session::{CrawlSession, SessionError, SessionReport};

/// Result of asking the scheduler to crawl one source.
#[derive(Debug)]
pub enum SourceOutcome {
    Completed(SessionReport),
    Failed {
        source: Source,
        error: SessionError,
    },
    /// A session for this source was already running; the trigger was
    /// folded into it.
    Skipped(Source),
}

/// Timer driving the periodic crawl.
#[async_trait]
pub trait Ticker: Send {
    /// Wait until the next crawl is due.
    async fn tick(&mut self);
}

/// Longest period an `IntervalTicker` accepts; longer ones are clamped.
pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(3650 * 86_400);

/// Fixed-period ticker over `tokio::time::interval`. The first tick fires
/// one full period after creation.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// `period` is clamped to between one millisecond and `MAX_TICK_PERIOD`.
    pub fn new(period: Duration) -> Self {
        let period = period.clamp(Duration::from_millis(1), MAX_TICK_PERIOD);
        let now = Instant::now();
        let start = now.checked_add(period).unwrap_or(now);
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Clears a source's busy flag when the crawl ends, is cancelled or panics.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs crawl sessions with at most one in flight per source.
pub struct CrawlScheduler {
    session: CrawlSession,
    busy: HashMap<Source, AtomicBool>,
}

impl CrawlScheduler {
    pub fn new(session: CrawlSession) -> Self {
        let busy = Source::ALL
            .iter()
            .map(|&s| (s, AtomicBool::new(false)))
            .collect();
        Self { session, busy }
    }

    /// Crawl one source unless a crawl of it is already running.
    pub async fn run_source(&self, source: Source) -> SourceOutcome {
        let Some(flag) = self.busy.get(&source) else {
            return SourceOutcome::Skipped(source);
        };
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!(%source, "Crawl already in progress, skipping");
            return SourceOutcome::Skipped(source);
        }
        let _guard = BusyGuard(flag);

        match self.session.run(source).await {
            Ok(report) => SourceOutcome::Completed(report),
            Err(error) => {
                error!(%source, error = %error, "Crawl failed");
                SourceOutcome::Failed { source, error }
            }
        }
    }

    /// Crawl every source concurrently and wait for all of them.
    pub async fn run_all(&self) -> Vec<SourceOutcome> {
        join_all(Source::ALL.iter().map(|&s| self.run_source(s))).await
    }

    /// Start a crawl of every source in the background and return at once.
    pub fn trigger_all(self: &Arc<Self>) {
        for source in Source::ALL {
            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                scheduler.run_source(source).await;
            });
        }
        info!("Crawl triggered for all sources");
    }

    /// Spawn a background loop that crawls every source on each tick.
    pub fn spawn_periodic<T>(self: &Arc<Self>, mut ticker: T) -> JoinHandle<()>
    where
        T: Ticker + 'static,
    {
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                ticker.tick().await;
                info!("Periodic crawl due");
                let outcomes = scheduler.run_all().await;
                let completed = outcomes
                    .iter()
                    .filter(|o| matches!(o, SourceOutcome::Completed(_)))
                    .count();
                info!(completed, total = outcomes.len(), "Periodic crawl finished");
            }
        });

        info!("Periodic crawl loop started");
        handle
    }
}
