pub mod client;
pub mod types;

pub use client::GitHubHost;
pub use types::{Commit, Review};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeHostError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("code host request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// Read-only client for the code host. Implementations are injected; the
/// engine never constructs its own transport or credentials.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Fetch one pull request by org/repo/number.
    async fn get_review(&self, org: &str, repo: &str, number: u64)
        -> Result<Review, CodeHostError>;

    /// Whether the pull request has been merged. Checked separately from the
    /// raw state, which conflates "closed because merged" with "abandoned".
    async fn is_merged(&self, org: &str, repo: &str, number: u64) -> Result<bool, CodeHostError>;

    /// Ordered commits of one pull request.
    async fn list_commits(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, CodeHostError>;

    /// Pull requests in org/repo that contain the given commit. Returns
    /// `NotFound` when the repository itself does not exist.
    async fn list_reviews_containing_commit(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<Review>, CodeHostError>;

    /// One page of the repository's full pull request history (all states),
    /// plus the next page cursor while more pages remain. `None` requests
    /// the first page.
    async fn list_all_reviews(
        &self,
        org: &str,
        repo: &str,
        page: Option<u32>,
    ) -> Result<(Vec<Review>, Option<u32>), CodeHostError>;
}
