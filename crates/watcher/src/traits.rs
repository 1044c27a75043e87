use analyzer_protocol::{InvalidationKey, PollTarget, TaskStatusReport, TransportError};
use async_trait::async_trait;

pub use analyzer_protocol::{LogNotifier, Notifier};

/// Performs one status lookup for a task on behalf of a principal.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch(&self, target: &PollTarget) -> Result<TaskStatusReport, TransportError>;
}

/// Marks cached views stale so they are recomputed on next read.
///
/// Implementations swallow their own failures; invalidating the same key twice
/// must be equivalent to invalidating it once.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: &InvalidationKey);
}
