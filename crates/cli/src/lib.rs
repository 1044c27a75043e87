//! HTTP implementations of the watcher and pager collaborators, plus the
//! environment-driven client configuration used by the `analyzer` binary.

pub mod config;
pub mod http;
pub mod session;

pub use config::ClientConfig;
pub use http::{Branch, BranchPageFetcher, HttpStatusFetcher, RepoRef, BRANCHES_PER_PAGE};
pub use session::await_terminal;
