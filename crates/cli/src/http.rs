use analyzer_pager::PageFetcher;
use analyzer_protocol::{status_message, Page, PollTarget, TaskStatusReport, TransportError};
use analyzer_watcher::StatusFetcher;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GitHub's maximum page size; a shorter page is the last one.
pub const BRANCHES_PER_PAGE: usize = 100;

fn network(err: &reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, TransportError> {
    let response = request.send().await.map_err(|err| network(&err))?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            message: status_message(status.as_u16()).to_string(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|err| TransportError::Decode(err.to_string()))
}

/// Looks up task progress on the analyzer backend.
#[derive(Debug, Clone)]
pub struct HttpStatusFetcher {
    client: Client,
    base_url: String,
}

impl HttpStatusFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn status_url(&self) -> String {
        format!("{}/analyzer/sync_status", self.base_url)
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    async fn fetch(&self, target: &PollTarget) -> Result<TaskStatusReport, TransportError> {
        let request = self.client.get(self.status_url()).query(&[
            ("task_id", target.task_id.as_str()),
            ("user_id", target.principal_id.as_str()),
        ]);
        let body: serde_json::Value = read_json(request).await?;
        TaskStatusReport::from_body(body)
            .ok_or_else(|| TransportError::Decode("response has no `status` field".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// Pages through a GitHub repository's branches.
#[derive(Debug, Clone)]
pub struct BranchPageFetcher {
    client: Client,
    api_url: String,
    token: Option<String>,
    per_page: usize,
}

impl BranchPageFetcher {
    pub fn new(client: Client, api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            per_page: BRANCHES_PER_PAGE,
        }
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    fn get(&self, url: String) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn default_branch(&self, repo: &RepoRef) -> Result<String, TransportError> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        let info: RepoInfo = read_json(self.get(url)).await?;
        Ok(info.default_branch)
    }
}

#[async_trait]
impl PageFetcher for BranchPageFetcher {
    type Resource = RepoRef;
    type Item = Branch;

    async fn fetch_page(&self, repo: &RepoRef, page: u32) -> Result<Page<Branch>, TransportError> {
        let url = format!("{}/repos/{}/{}/branches", self.api_url, repo.owner, repo.repo);
        let request = self.get(url).query(&[
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
        ]);
        let branches: Vec<Branch> = read_json(request).await?;
        log::debug!("{repo} page {page}: {} branches", branches.len());
        let is_last = branches.len() < self.per_page;
        Ok(Page::new(branches, is_last))
    }
}
