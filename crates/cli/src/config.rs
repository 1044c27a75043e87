use analyzer_pager::{Backoff, CollectorConfig, RetryPolicy, DEFAULT_MAX_RETRIES_PER_PAGE};
use analyzer_watcher::WatcherConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub page_retries: u32,
    /// Zero means retry immediately.
    pub page_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_retries: DEFAULT_MAX_RETRIES_PER_PAGE,
            page_backoff: Duration::ZERO,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn duration_from_ms(value: Option<String>) -> Option<Duration> {
    non_empty(value)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a variable lookup; unset, blank or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: non_empty(lookup("ANALYZER_BASE_URL")).unwrap_or(defaults.base_url),
            github_api_url: non_empty(lookup("GITHUB_API_URL"))
                .unwrap_or(defaults.github_api_url),
            github_token: non_empty(lookup("GITHUB_TOKEN")),
            poll_interval: duration_from_ms(lookup("ANALYZER_POLL_INTERVAL_MS"))
                .unwrap_or(defaults.poll_interval),
            request_timeout: duration_from_ms(lookup("ANALYZER_REQUEST_TIMEOUT_MS"))
                .unwrap_or(defaults.request_timeout),
            page_retries: non_empty(lookup("ANALYZER_PAGE_RETRIES"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_retries),
            page_backoff: duration_from_ms(lookup("ANALYZER_PAGE_BACKOFF_MS"))
                .unwrap_or(defaults.page_backoff),
        }
    }

    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("analyzer-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }

    #[must_use]
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig::default().with_poll_interval(self.poll_interval)
    }

    #[must_use]
    pub fn collector_config(&self) -> CollectorConfig {
        let backoff = if self.page_backoff.is_zero() {
            Backoff::None
        } else {
            Backoff::Exponential {
                base: self.page_backoff,
                max: self.page_backoff * 8,
            }
        };
        CollectorConfig {
            retry: RetryPolicy::immediate(self.page_retries).with_backoff(backoff),
            ..CollectorConfig::default()
        }
    }
}
