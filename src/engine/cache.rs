use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::info;

use crate::engine::EngineError;
use crate::github::{CodeHost, Commit, Review};

/// One historical pull request and its full commit list.
#[derive(Debug, Clone)]
pub struct ReviewWithCommits {
    pub review: Review,
    pub commits: Vec<Commit>,
}

/// Point-in-time enumeration of every pull request (any state) in one
/// repository. Built at most once per run and never invalidated; staleness
/// over the lifetime of one invocation is accepted.
#[derive(Debug)]
pub struct RepoSnapshot {
    pub reviews: Vec<ReviewWithCommits>,
}

type SnapshotCell = Arc<OnceCell<Arc<RepoSnapshot>>>;

/// Process-wide memo of repository snapshots keyed by "org/repo".
///
/// Concurrent requests for the same uncached key wait behind a single build
/// instead of enumerating the repository twice; requests for different keys
/// proceed independently. The map lock is held only to look up the per-key
/// cell, never across a build.
#[derive(Default)]
pub struct RepoReferenceCache {
    entries: Mutex<HashMap<String, SnapshotCell>>,
}

impl RepoReferenceCache {
    pub fn new() -> RepoReferenceCache {
        RepoReferenceCache::default()
    }

    pub async fn get_snapshot(
        &self,
        host: &dyn CodeHost,
        org: &str,
        repo: &str,
    ) -> Result<Arc<RepoSnapshot>, EngineError> {
        let repo_key = format!("{}/{}", org, repo);
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(repo_key).or_default())
        };

        // A failed build is never stored; the next caller retries from an
        // empty cell.
        let snapshot = cell
            .get_or_try_init(|| build_snapshot(host, org, repo))
            .await?;
        Ok(Arc::clone(snapshot))
    }
}

async fn build_snapshot(
    host: &dyn CodeHost,
    org: &str,
    repo: &str,
) -> Result<Arc<RepoSnapshot>, EngineError> {
    info!(org, repo, "building cache of pull requests");

    let mut reviews = Vec::new();
    let mut page = None;
    loop {
        let (batch, next) = host
            .list_all_reviews(org, repo, page)
            .await
            .map_err(|source| EngineError::SnapshotList {
                repo_key: format!("{}/{}", org, repo),
                source,
            })?;

        for review in batch {
            let commits = host
                .list_commits(org, repo, review.number)
                .await
                .map_err(|source| EngineError::SnapshotCommits {
                    number: review.number,
                    source,
                })?;
            reviews.push(ReviewWithCommits { review, commits });
        }

        if next.is_none() {
            break;
        }
        page = next;
    }

    Ok(Arc::new(RepoSnapshot { reviews }))
}
