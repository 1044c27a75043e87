use analyzer_protocol::{InvalidationKey, NoticeOptions};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_SCOPE: [&str; 2] = ["project-ingestion", "get-summary"];
const DEFAULT_FAILURE_MESSAGE: &str = "Something went wrong while syncing please retry!";

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    /// Leading segments of the invalidation key; the task id is appended.
    pub invalidation_scope: Vec<String>,
    pub failure_message: String,
    pub failure_notice: NoticeOptions,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            invalidation_scope: DEFAULT_SCOPE.iter().map(|s| (*s).to_string()).collect(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            failure_notice: NoticeOptions::default(),
        }
    }
}

impl WatcherConfig {
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn invalidation_key(&self, task_id: &str) -> InvalidationKey {
        InvalidationKey::new(
            self.invalidation_scope
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(task_id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_appends_task_id_to_scope() {
        let cfg = WatcherConfig::default();
        assert_eq!(
            cfg.invalidation_key("t-9"),
            InvalidationKey::new(["project-ingestion", "get-summary", "t-9"])
        );
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
    }
}
