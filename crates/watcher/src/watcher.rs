use crate::{CacheInvalidator, Notifier, StatusFetcher, WatcherConfig};
use analyzer_protocol::{PollState, PollTarget, TaskStatus, TaskStatusReport, TransportError};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;

/// One accepted status report for the target being polled.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub target: PollTarget,
    pub report: TaskStatusReport,
    pub terminal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatcherHealth {
    /// Lookups whose result was acted on (stale resolutions are not counted).
    pub lookups: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub rejected_starts: u32,
}

/// Polls one analyzer task at a time until it reaches a terminal status.
///
/// Handles are cheap to clone; dropping the last one stops polling. `start`
/// spawns onto the ambient Tokio runtime.
#[derive(Clone)]
pub struct TaskWatcher {
    inner: Arc<TaskWatcherInner>,
}

struct TaskWatcherInner {
    ctx: PollContext,
}

#[derive(Clone)]
struct PollContext {
    fetcher: Arc<dyn StatusFetcher>,
    invalidator: Arc<dyn CacheInvalidator>,
    notifier: Arc<dyn Notifier>,
    config: Arc<WatcherConfig>,
    shared: Arc<Mutex<PollShared>>,
    state_tx: watch::Sender<PollState>,
    update_tx: broadcast::Sender<TaskUpdate>,
}

struct PollShared {
    /// Bumped by every `start` and `stop`; a lookup only acts if it still matches.
    generation: u64,
    state: PollState,
    latest: Option<TaskStatusReport>,
    health: WatcherHealth,
    handle: Option<JoinHandle<()>>,
}

enum Tick {
    Continue,
    Finished,
}

impl TaskWatcher {
    pub fn new(
        config: WatcherConfig,
        fetcher: Arc<dyn StatusFetcher>,
        invalidator: Arc<dyn CacheInvalidator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollState::Idle);
        let (update_tx, _) = broadcast::channel(32);
        let shared = PollShared {
            generation: 0,
            state: PollState::Idle,
            latest: None,
            health: WatcherHealth::default(),
            handle: None,
        };

        Self {
            inner: Arc::new(TaskWatcherInner {
                ctx: PollContext {
                    fetcher,
                    invalidator,
                    notifier,
                    config: Arc::new(config),
                    shared: Arc::new(Mutex::new(shared)),
                    state_tx,
                    update_tx,
                },
            }),
        }
    }

    /// Begins polling `target`, superseding any poll in progress.
    ///
    /// Blank identifiers leave the watcher untouched; the rejection is logged
    /// and counted in [`WatcherHealth::rejected_starts`].
    pub fn start(&self, target: PollTarget) {
        let ctx = &self.inner.ctx;
        if let Err(err) = target.validate() {
            error!("Cannot start polling: {err}");
            let mut shared = ctx.lock();
            shared.health.rejected_starts += 1;
            shared.health.last_error = Some(err.to_string());
            return;
        }

        let mut shared = ctx.lock();
        shared.generation += 1;
        let generation = shared.generation;
        if let Some(handle) = shared.handle.take() {
            handle.abort();
        }
        debug!(
            "start polling task {} for {} (generation {generation})",
            target.task_id, target.principal_id
        );
        shared.state = PollState::Active(target.clone());
        shared.latest = None;
        shared.health.consecutive_failures = 0;
        ctx.state_tx.send_replace(shared.state.clone());
        shared.handle = Some(tokio::spawn(ctx.clone().run(generation, target)));
    }

    /// Stops polling. Safe to call repeatedly and at any time; a lookup still in
    /// flight is cancelled and its eventual result ignored.
    pub fn stop(&self) {
        self.inner.ctx.stop();
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        self.inner.ctx.lock().state.clone()
    }

    /// Latest report for the active target; `None` before the first lookup
    /// resolves or when not polling.
    #[must_use]
    pub fn current_status(&self) -> Option<TaskStatusReport> {
        let shared = self.inner.ctx.lock();
        if shared.state.is_active() {
            shared.latest.clone()
        } else {
            None
        }
    }

    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<PollState> {
        self.inner.ctx.state_tx.subscribe()
    }

    #[must_use]
    pub fn subscribe_updates(&self) -> broadcast::Receiver<TaskUpdate> {
        self.inner.ctx.update_tx.subscribe()
    }

    #[must_use]
    pub fn health_snapshot(&self) -> WatcherHealth {
        self.inner.ctx.lock().health.clone()
    }

    #[must_use]
    pub fn config(&self) -> &WatcherConfig {
        &self.inner.ctx.config
    }
}

impl Drop for TaskWatcherInner {
    fn drop(&mut self) {
        self.ctx.stop();
    }
}

impl PollContext {
    fn lock(&self) -> MutexGuard<'_, PollShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        let mut shared = self.lock();
        shared.generation += 1;
        if let Some(handle) = shared.handle.take() {
            handle.abort();
        }
        shared.latest = None;
        if shared.state != PollState::Stopped {
            debug!("stop polling (generation {})", shared.generation);
            shared.state = PollState::Stopped;
            self.state_tx.send_replace(PollState::Stopped);
        }
    }

    async fn run(self, generation: u64, target: PollTarget) {
        loop {
            debug!("lookup status for task {}", target.task_id);
            let result = self.fetcher.fetch(&target).await;
            match self.accept(generation, &target, result) {
                Tick::Continue => time::sleep(self.config.poll_interval).await,
                Tick::Finished => return,
            }
        }
    }

    /// Applies one lookup result. Runs entirely under the state lock so a
    /// concurrent `start`/`stop` either sees the terminal transition or makes
    /// this result stale; never both. A terminal report is invalidated before
    /// the update and the `Stopped` state are published.
    fn accept(
        &self,
        generation: u64,
        target: &PollTarget,
        result: Result<TaskStatusReport, TransportError>,
    ) -> Tick {
        let mut shared = self.lock();
        if shared.generation != generation || !shared.state.is_active() {
            debug!("discarding stale status for task {}", target.task_id);
            return Tick::Finished;
        }
        shared.health.lookups += 1;

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                warn!("Status lookup for task {} failed: {err}", target.task_id);
                shared.health.consecutive_failures += 1;
                shared.health.last_error = Some(err.to_string());
                return Tick::Continue;
            }
        };

        shared.health.consecutive_failures = 0;
        let terminal = report.is_terminal();
        if terminal {
            self.finish(target, report.status);
        }
        let _ = self.update_tx.send(TaskUpdate {
            target: target.clone(),
            report: report.clone(),
            terminal,
        });

        if !terminal {
            shared.latest = Some(report);
            return Tick::Continue;
        }

        shared.state = PollState::Stopped;
        shared.latest = None;
        shared.handle = None;
        self.state_tx.send_replace(PollState::Stopped);
        Tick::Finished
    }

    fn finish(&self, target: &PollTarget, status: TaskStatus) {
        let key = self.config.invalidation_key(&target.task_id);
        info!("Task {} finished with {status}; invalidating {key}", target.task_id);
        self.invalidator.invalidate(&key);
        if status == TaskStatus::Failed {
            self.notifier
                .warn(&self.config.failure_message, &self.config.failure_notice);
        }
    }
}
