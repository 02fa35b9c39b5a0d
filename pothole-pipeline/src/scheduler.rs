//! Periodic polling of a feed into published snapshots.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use pothole_adapters::{FeedSource, FetchError};
use pothole_types::Snapshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::aggregate::build_snapshot;
use crate::clock::{Clock, SystemClock};
use crate::normalize::normalize;

/// Default time between poll cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// A cycle's fetch is in flight.
    Polling,
    /// Stopped for good. Nothing is published after this.
    Stopped,
}

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was published.
    Published { events: usize, dropped: usize },
    /// The fetch failed; the previous snapshot stays current.
    Failed(String),
    /// Another cycle was already in flight.
    Skipped,
    /// The scheduler was stopped before or during the cycle.
    Stopped,
}

/// Fetch a feed once and turn the result into a snapshot.
///
/// Used by one-shot callers that want the error instead of the scheduler's
/// keep-the-last-snapshot behaviour.
pub async fn collect(feed: &dyn FeedSource, clock: &dyn Clock) -> Result<Snapshot, FetchError> {
    let records = feed.fetch().await?;
    let events = normalize(&records);
    Ok(build_snapshot(events, clock.now()))
}

struct Inner {
    feed: Arc<dyn FeedSource>,
    clock: Arc<dyn Clock>,
    state: Mutex<SchedulerState>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    last_error: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Resets `Polling` back to `Idle` however the cycle ends, including when
/// the cycle's future is dropped mid-fetch.
struct CycleGuard<'a> {
    state: &'a Mutex<SchedulerState>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if *state == SchedulerState::Polling {
            *state = SchedulerState::Idle;
        }
    }
}

impl Inner {
    async fn run_cycle(&self) -> CycleOutcome {
        {
            let mut state = self.state.lock();
            match *state {
                SchedulerState::Stopped => return CycleOutcome::Stopped,
                SchedulerState::Polling => {
                    debug!(feed = %self.feed.description(), "previous cycle still in flight, skipping");
                    return CycleOutcome::Skipped;
                }
                SchedulerState::Idle => *state = SchedulerState::Polling,
            }
        }
        let _guard = CycleGuard { state: &self.state };

        let records = match self.feed.fetch().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    feed = %self.feed.description(),
                    error = %e,
                    "poll cycle failed, keeping previous snapshot"
                );
                let message = e.to_string();
                *self.last_error.lock() = Some(message.clone());
                return CycleOutcome::Failed(message);
            }
        };

        let events = normalize(&records);
        let dropped = records.len() - events.len();
        let snapshot = build_snapshot(events, self.clock.now());
        let published = snapshot.len();

        let state = self.state.lock();
        if *state == SchedulerState::Stopped {
            return CycleOutcome::Stopped;
        }
        self.snapshot_tx.send_replace(Arc::new(snapshot));
        *self.last_error.lock() = None;

        info!(
            feed = %self.feed.description(),
            events = published,
            dropped,
            "published snapshot"
        );
        CycleOutcome::Published {
            events: published,
            dropped,
        }
    }
}

/// Polls a feed on a fixed interval and publishes a fresh [`Snapshot`]
/// after every successful cycle.
///
/// Cloning is cheap; clones control the same scheduler. The background task
/// ends once every clone has been dropped, or on [`Scheduler::stop`].
///
/// # Example
///
/// ```rust,no_run
/// use pothole_adapters::thingspeak::ThingSpeakClient;
/// use pothole_pipeline::Scheduler;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let feed = ThingSpeakClient::builder("3153910").build()?;
///     let scheduler = Scheduler::builder(feed)
///         .interval(Duration::from_secs(60))
///         .build();
///
///     let mut snapshots = scheduler.subscribe();
///     scheduler.start();
///
///     snapshots.changed().await?;
///     println!("{} events", snapshots.borrow().kpis.total);
///
///     scheduler.stop();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
    interval: Duration,
}

impl Scheduler {
    /// Create a new builder for the given feed.
    pub fn builder(feed: impl FeedSource + 'static) -> SchedulerBuilder {
        SchedulerBuilder::new(Arc::new(feed))
    }

    /// Begin polling: one cycle right away, then one per interval.
    ///
    /// Must be called from within a Tokio runtime. Calling it again, or
    /// after [`stop`](Self::stop), does nothing.
    pub fn start(&self) {
        if self.state() == SchedulerState::Stopped {
            return;
        }
        let mut task = self.inner.task.lock();
        if task.is_some() {
            return;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.interval;
        info!(
            feed = %self.inner.feed.description(),
            interval = ?period,
            "starting scheduler"
        );

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut last_finished: Option<Instant> = None;
            loop {
                let due = ticker.tick().await;
                // A tick that came due while the previous cycle ran is dropped.
                // The next one stays on the original cadence.
                if last_finished.is_some_and(|finished| due < finished) {
                    debug!("skipping tick missed during a cycle");
                    continue;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.run_cycle().await == CycleOutcome::Stopped {
                    break;
                }
                last_finished = Some(Instant::now());
            }
        }));
    }

    /// Stop polling. Idempotent.
    ///
    /// An in-flight fetch is cancelled and its result, if it arrives, is
    /// never published.
    pub fn stop(&self) {
        {
            let mut state = self.inner.state.lock();
            if *state == SchedulerState::Stopped {
                return;
            }
            *state = SchedulerState::Stopped;
        }
        if let Some(task) = self.inner.task.lock().take() {
            task.abort();
        }
        info!(feed = %self.inner.feed.description(), "scheduler stopped");
    }

    /// Run one cycle now, outside the timer.
    ///
    /// Returns [`CycleOutcome::Skipped`] when a cycle is already in flight,
    /// so a manual refresh never overlaps a timed one.
    pub async fn poll_now(&self) -> CycleOutcome {
        self.inner.run_cycle().await
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The current snapshot. Empty until the first successful cycle.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> SchedulerState {
        *self.inner.state.lock()
    }

    /// True while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state() == SchedulerState::Polling
    }

    /// Message of the most recent failed cycle, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Description of the feed being polled.
    pub fn feed_description(&self) -> &str {
        self.inner.feed.description()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("feed", &self.inner.feed)
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}

/// Builder for configuring a Scheduler.
#[derive(Debug)]
pub struct SchedulerBuilder {
    feed: Arc<dyn FeedSource>,
    clock: Option<Arc<dyn Clock>>,
    interval: Option<Duration>,
}

impl SchedulerBuilder {
    /// Create a builder for an already shared feed.
    pub fn new(feed: Arc<dyn FeedSource>) -> Self {
        Self {
            feed,
            clock: None,
            interval: None,
        }
    }

    /// Set the time between cycles (default: 60 seconds). A zero interval
    /// falls back to the default.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the reference clock (default: wall clock).
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the scheduler. It starts out `Idle` holding the empty snapshot.
    pub fn build(self) -> Scheduler {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::empty()));
        let inner = Inner {
            feed: self.feed,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            state: Mutex::new(SchedulerState::Idle),
            snapshot_tx,
            last_error: Mutex::new(None),
            task: Mutex::new(None),
        };

        Scheduler {
            inner: Arc::new(inner),
            interval: self
                .interval
                .filter(|i| !i.is_zero())
                .unwrap_or(DEFAULT_INTERVAL),
        }
    }
}
