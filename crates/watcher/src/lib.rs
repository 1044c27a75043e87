//! # Analyzer Watcher
//!
//! Observes long-running analyzer tasks (ingestion, re-analysis, repository
//! sync) until they reach a terminal status, then invalidates the cached views
//! derived from them.
//!
//! ```text
//! start(target)
//!     │
//!     ├──> StatusFetcher (immediately, then every poll_interval)
//!     │      └─> Pending / Running ──> schedule next tick
//!     │
//!     └──> Completed / Failed
//!            ├─> CacheInvalidator (once, keyed by the polled task id)
//!            ├─> Notifier (Failed only)
//!            └─> Stopped
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use analyzer_protocol::PollTarget;
//! use analyzer_watcher::{QueryCache, StatusFetcher, TaskWatcher, WatcherConfig, LogNotifier};
//! use std::sync::Arc;
//!
//! async fn watch(fetcher: Arc<dyn StatusFetcher>) {
//!     let cache = Arc::new(QueryCache::new());
//!     let watcher = TaskWatcher::new(WatcherConfig::default(), fetcher, cache, Arc::new(LogNotifier));
//!     let mut updates = watcher.subscribe_updates();
//!
//!     watcher.start(PollTarget::new("task-42", "user-7"));
//!     while let Ok(update) = updates.recv().await {
//!         if update.terminal {
//!             break;
//!         }
//!     }
//! }
//! ```

mod cache;
mod config;
mod traits;
mod watcher;

pub use cache::QueryCache;
pub use config::WatcherConfig;
pub use traits::{CacheInvalidator, LogNotifier, Notifier, StatusFetcher};
pub use watcher::{TaskUpdate, TaskWatcher, WatcherHealth};
