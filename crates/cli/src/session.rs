use analyzer_protocol::TaskStatusReport;
use analyzer_watcher::{TaskUpdate, TaskWatcher};
use anyhow::{bail, Result};
use std::future::Future;
use tokio::sync::broadcast::{self, error::RecvError};

/// Waits for the terminal report of the task `watcher` is polling.
///
/// `interrupt` is polled across the whole wait; when it resolves first the
/// watcher is stopped and an error returned.
pub async fn await_terminal(
    watcher: &TaskWatcher,
    updates: &mut broadcast::Receiver<TaskUpdate>,
    interrupt: impl Future,
) -> Result<TaskStatusReport> {
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => {
                watcher.stop();
                bail!("Interrupted before the task finished");
            }
            update = updates.recv() => match update {
                Ok(update) if update.terminal => return Ok(update.report),
                Ok(update) => log::info!("Task {} is {}", update.target.task_id, update.report.status),
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!("skipped {skipped} status updates");
                }
                Err(RecvError::Closed) => bail!("Watcher closed before task finished"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_protocol::{PollState, PollTarget, TaskStatus, TransportError};
    use analyzer_watcher::{LogNotifier, QueryCache, StatusFetcher, WatcherConfig};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Reports `Running` until `finish_after` lookups have been served.
    struct Countdown {
        calls: AtomicUsize,
        finish_after: usize,
    }

    #[async_trait]
    impl StatusFetcher for Countdown {
        async fn fetch(&self, _target: &PollTarget) -> Result<TaskStatusReport, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let status = if call >= self.finish_after {
                TaskStatus::Completed
            } else {
                TaskStatus::Running
            };
            Ok(TaskStatusReport::new(status, json!({ "status": status.as_str() })))
        }
    }

    fn watcher(finish_after: usize) -> TaskWatcher {
        TaskWatcher::new(
            WatcherConfig::default().with_poll_interval(Duration::from_millis(10)),
            Arc::new(Countdown {
                calls: AtomicUsize::new(0),
                finish_after,
            }),
            Arc::new(QueryCache::new()),
            Arc::new(LogNotifier),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn returns_terminal_report() {
        let watcher = watcher(3);
        let mut updates = watcher.subscribe_updates();
        watcher.start(PollTarget::new("t-1", "u-1"));

        let report = await_terminal(&watcher, &mut updates, std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(report.status, TaskStatus::Completed);
        assert_eq!(watcher.state(), PollState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_between_updates_stops_watcher() {
        let watcher = watcher(usize::MAX);
        let mut updates = watcher.subscribe_updates();
        watcher.start(PollTarget::new("t-1", "u-1"));

        let err = await_terminal(
            &watcher,
            &mut updates,
            tokio::time::sleep(Duration::from_millis(35)),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Interrupted"));
        assert_eq!(watcher.state(), PollState::Stopped);
    }

    #[tokio::test]
    async fn interrupt_raised_before_waiting_is_honoured() {
        let watcher = watcher(usize::MAX);
        let mut updates = watcher.subscribe_updates();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();
        watcher.start(PollTarget::new("t-1", "u-1"));

        assert!(await_terminal(&watcher, &mut updates, rx).await.is_err());
        assert_eq!(watcher.state(), PollState::Stopped);
    }
}
