use crate::RetryPolicy;
use analyzer_protocol::{
    CollectError, CollectionResult, NoticeOptions, Notifier, Page, TransportError,
};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

pub const DEFAULT_MAX_PAGES: u32 = 1_000;
const DEFAULT_FAILURE_MESSAGE: &str = "Failed to fetch the full listing. Showing partial results";

/// Fetches one page of a remote collection. Pages are numbered from 1.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Resource: ?Sized + Sync;
    type Item: Send;

    async fn fetch_page(
        &self,
        resource: &Self::Resource,
        page: u32,
    ) -> Result<Page<Self::Item>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub retry: RetryPolicy,
    /// Ceiling on pages walked for a server that never reports a last page.
    pub max_pages: u32,
    pub failure_message: String,
    pub failure_notice: NoticeOptions,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_pages: DEFAULT_MAX_PAGES,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            failure_notice: NoticeOptions::default(),
        }
    }
}

pub struct PagedCollector<F> {
    fetcher: F,
    config: CollectorConfig,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<F: PageFetcher> PagedCollector<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, CollectorConfig::default())
    }

    pub fn with_config(fetcher: F, config: CollectorConfig) -> Self {
        Self {
            fetcher,
            config,
            notifier: None,
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Walks every page of `resource` with the configured retry budget.
    pub async fn collect(&self, resource: &F::Resource) -> CollectionResult<F::Item> {
        self.collect_with_retries(resource, self.config.retry.max_retries)
            .await
    }

    /// Walks every page of `resource`, retrying each failing page up to
    /// `max_retries_per_page` times. Never fails: errors end the walk and are
    /// reported in the returned result next to everything fetched so far.
    pub async fn collect_with_retries(
        &self,
        resource: &F::Resource,
        max_retries_per_page: u32,
    ) -> CollectionResult<F::Item> {
        let mut items = Vec::new();
        let mut fetched_pages = 0u32;
        let mut page = 1u32;

        let error = loop {
            if fetched_pages >= self.config.max_pages {
                break CollectError::PageLimit(self.config.max_pages);
            }
            match self.fetch_with_retry(resource, page, max_retries_per_page).await {
                Ok(fetched) => {
                    fetched_pages += 1;
                    debug!("page {page}: {} items", fetched.items.len());
                    items.extend(fetched.items);
                    if fetched.is_last {
                        return CollectionResult::complete(items);
                    }
                    page += 1;
                }
                Err(err) => break err,
            }
        };

        warn!("Listing stopped after {fetched_pages} pages: {error}");
        if let Some(notifier) = &self.notifier {
            notifier.warn(&self.config.failure_message, &self.config.failure_notice);
        }
        CollectionResult {
            items,
            truncated: fetched_pages > 0,
            error: Some(error),
        }
    }

    async fn fetch_with_retry(
        &self,
        resource: &F::Resource,
        page: u32,
        max_retries: u32,
    ) -> Result<Page<F::Item>, CollectError> {
        let mut retry = 0u32;
        loop {
            match self.fetcher.fetch_page(resource, page).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) if retry < max_retries => {
                    let delay = self.config.retry.delay_for(retry);
                    debug!(
                        "page {page} attempt {} failed: {err}; retrying in {}ms",
                        retry + 1,
                        delay.as_millis()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    retry += 1;
                }
                Err(err) => {
                    return Err(CollectError::Transport {
                        page,
                        attempts: retry + 1,
                        source: err,
                    })
                }
            }
        }
    }
}
