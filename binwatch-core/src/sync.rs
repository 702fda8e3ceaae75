//! Polling synchronizer that owns the authoritative snapshot and its status.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::model::{Connection, RawPair, Snapshot, SyncState, SyncStatus, TrashKind};
use crate::ports::{ContainerSource, FetchError};

/// Poll cadence used when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest cadence accepted by [`Synchronizer::start`].
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Default)]
struct Timer {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Single writer of [`SyncState`].
///
/// Attempts are serialized by an async mutex. Timer ticks that find an attempt in flight are
/// dropped; manual refreshes wait for the in-flight attempt and run right after it. Every
/// attempt publishes its outcome in one [`watch`] update, so observers never see a snapshot
/// assembled from two different fetches.
pub struct Synchronizer {
    source: Arc<dyn ContainerSource>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<SyncState>,
    attempt: Arc<AsyncMutex<()>>,
    timer: Mutex<Timer>,
}

impl Synchronizer {
    /// Create a synchronizer reading from `source`. Nothing is fetched until [`start`] or
    /// [`refresh_now`] is called.
    ///
    /// [`start`]: Synchronizer::start
    /// [`refresh_now`]: Synchronizer::refresh_now
    #[must_use]
    pub fn new(source: Arc<dyn ContainerSource>, clock: Arc<dyn Clock>) -> Self {
        let (state, _initial) = watch::channel(SyncState::default());
        Self {
            source,
            clock,
            state,
            attempt: Arc::new(AsyncMutex::new(())),
            timer: Mutex::new(Timer::default()),
        }
    }

    /// Current snapshot and status.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.timer.lock().task.is_some()
    }

    /// Start polling every `interval`, with the first attempt firing immediately.
    ///
    /// Calling `start` again replaces the previous timer. Intervals shorter than
    /// [`MIN_POLL_INTERVAL`] are raised to it. Must be called from within a Tokio runtime.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let period = interval.max(MIN_POLL_INTERVAL);
        let mut timer = self.timer.lock();
        timer.generation = timer.generation.wrapping_add(1);
        let generation = timer.generation;

        let task = tokio::spawn(run_timer(Arc::downgrade(self), period, generation));
        if let Some(previous) = timer.task.replace(task) {
            previous.abort();
        }
        info!(interval = ?period, "polling started");
    }

    /// Stop the poll timer. An attempt already in flight still completes and commits.
    pub fn stop(&self) {
        let mut timer = self.timer.lock();
        timer.generation = timer.generation.wrapping_add(1);
        if let Some(task) = timer.task.take() {
            task.abort();
            info!("polling stopped");
        }
    }

    /// Run one attempt now, waiting for any in-flight attempt to finish first.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of this attempt. The error is also recorded in the status;
    /// the snapshot keeps its previous value.
    pub async fn refresh_now(&self) -> Result<Snapshot, FetchError> {
        let guard = Arc::clone(&self.attempt).lock_owned().await;
        self.run_attempt(guard).await
    }

    // Called by the timer with the generation lock held, so `stop` cannot race a new attempt.
    fn fire_tick(self: Arc<Self>, generation: u64) -> bool {
        let timer = self.timer.lock();
        if timer.generation != generation {
            return false;
        }

        match Arc::clone(&self.attempt).try_lock_owned() {
            Ok(guard) => {
                let sync = Arc::clone(&self);
                tokio::spawn(async move {
                    if sync.run_attempt(guard).await.is_err() {
                        debug!("scheduled attempt failed, retrying on next tick");
                    }
                });
            }
            Err(_busy) => debug!("attempt still in flight, skipping tick"),
        }
        drop(timer);
        true
    }

    async fn run_attempt(&self, _guard: OwnedMutexGuard<()>) -> Result<Snapshot, FetchError> {
        self.state.send_modify(|state| begin(&mut state.status));
        let pending = PendingAttempt::new(&self.state);

        let outcome = self.source.fetch().await;
        pending.settle();

        match outcome {
            Ok(raw) => {
                let snapshot = normalize(&raw);
                let now = self.clock.now();
                self.state.send_modify(|state| accept(state, snapshot, now));
                debug!(
                    price = snapshot.price,
                    weight = snapshot.weight,
                    trash_kind = %snapshot.trash_kind,
                    "snapshot committed"
                );
                Ok(snapshot)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "fetch failed, keeping last snapshot");
                self.state.send_modify(|state| reject(&mut state.status, message));
                Err(err)
            }
        }
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        if let Some(task) = self.timer.get_mut().task.take() {
            task.abort();
        }
    }
}

/// Clears the refreshing flag if an attempt is dropped before it commits, so a cancelled
/// `refresh_now` future cannot leave the status stuck.
struct PendingAttempt<'a> {
    state: &'a watch::Sender<SyncState>,
    armed: bool,
}

impl<'a> PendingAttempt<'a> {
    fn new(state: &'a watch::Sender<SyncState>) -> Self {
        Self { state, armed: true }
    }

    fn settle(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("attempt cancelled before commit");
            self.state.send_modify(|state| state.status.is_refreshing = false);
        }
    }
}

async fn run_timer(owner: Weak<Synchronizer>, period: Duration, generation: u64) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(sync) = owner.upgrade() else {
            break;
        };
        if !sync.fire_tick(generation) {
            break;
        }
    }
}

/// Turn a raw fetch result into a snapshot: absent fields default to `0`, the trash
/// indicator maps through [`TrashKind::from_raw`].
#[must_use]
pub fn normalize(raw: &RawPair) -> Snapshot {
    Snapshot {
        price: raw.container.price.unwrap_or(0.0),
        weight: raw.container.weight.unwrap_or(0.0),
        trash_kind: TrashKind::from_raw(&raw.trash),
    }
}

fn begin(status: &mut SyncStatus) {
    if !status.is_loading {
        status.is_refreshing = true;
    }
}

fn accept(state: &mut SyncState, snapshot: Snapshot, now: DateTime<Utc>) {
    state.snapshot = snapshot;

    let status = &mut state.status;
    status.connection = Connection::Connected;
    status.last_updated = Some(status.last_updated.map_or(now, |previous| previous.max(now)));
    status.last_error = None;
    finish(status);
}

fn reject(status: &mut SyncStatus, message: String) {
    status.connection = Connection::Disconnected;
    status.last_error = Some(message);
    finish(status);
}

fn finish(status: &mut SyncStatus) {
    status.is_loading = false;
    status.is_refreshing = false;
}
