//! # Analyzer Pager
//!
//! Walks a page-numbered remote listing to exhaustion. Transient failures are
//! retried per page; when the budget runs out the pages already fetched are
//! returned as a truncated result instead of being discarded.

mod collector;
mod retry;

pub use collector::{CollectorConfig, PageFetcher, PagedCollector, DEFAULT_MAX_PAGES};
pub use retry::{Backoff, RetryPolicy, DEFAULT_MAX_RETRIES_PER_PAGE};
