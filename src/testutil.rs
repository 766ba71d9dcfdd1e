//! In-memory fakes for the two remote collaborators, shared by the engine
//! unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::github::{CodeHost, CodeHostError, Commit, Review};
use crate::tracker::{IssueTracker, ItemSummary, ItemType, ParentField, TrackerError, WorkItem};

/// History pages come back two at a time so the pagination loop is exercised
/// with small fixtures.
const FAKE_PAGE_SIZE: usize = 2;

pub fn pull_url(org: &str, repo: &str, number: u64) -> String {
    format!("https://github.com/{}/{}/pull/{}", org, repo, number)
}

pub fn work_item(key: &str, item_type: ItemType, description: &str) -> WorkItem {
    WorkItem {
        key: key.to_string(),
        item_type,
        status: "In Progress".to_string(),
        summary: format!("summary of {}", key),
        description: description.to_string(),
        comments: vec![],
        subtask_keys: vec![],
    }
}

pub fn review(org: &str, repo: &str, number: u64, state: &str, title: &str) -> Review {
    Review {
        number,
        state: state.to_string(),
        html_url: pull_url(org, repo, number),
        title: title.to_string(),
        base_branch: "main".to_string(),
    }
}

#[derive(Default)]
pub struct FakeTracker {
    items: HashMap<String, WorkItem>,
    children: HashMap<(ParentField, String), Vec<ItemSummary>>,
    pub item_fetches: Arc<AtomicUsize>,
}

impl FakeTracker {
    pub fn new() -> FakeTracker {
        FakeTracker::default()
    }

    pub fn with_item(mut self, item: WorkItem) -> FakeTracker {
        self.items.insert(item.key.clone(), item);
        self
    }

    pub fn with_children(mut self, field: ParentField, parent: &str, keys: &[&str]) -> FakeTracker {
        let summaries = keys
            .iter()
            .map(|key| ItemSummary {
                key: key.to_string(),
                summary: format!("summary of {}", key),
            })
            .collect();
        self.children.insert((field, parent.to_string()), summaries);
        self
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn get_item(&self, key: &str) -> Result<WorkItem, TrackerError> {
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        self.items
            .get(key)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(key.to_string()))
    }

    async fn search_by_parent_link(
        &self,
        field: ParentField,
        key: &str,
    ) -> Result<Vec<ItemSummary>, TrackerError> {
        Ok(self
            .children
            .get(&(field, key.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeHost {
    reviews: HashMap<(String, String, u64), Review>,
    merged: HashSet<(String, String, u64)>,
    commits: HashMap<(String, String, u64), Vec<Commit>>,
    commit_pulls: HashMap<(String, String, String), Vec<Review>>,
    history: HashMap<(String, String), Vec<Review>>,
    missing_repos: HashSet<(String, String)>,
    build_delay: Option<Duration>,
    fail_enumerations: AtomicUsize,
    /// First-page history requests, i.e. distinct enumeration sequences.
    pub enumerations: Arc<AtomicUsize>,
    pub commit_searches: Arc<AtomicUsize>,
    pub commit_lists: Arc<AtomicUsize>,
}

impl FakeHost {
    pub fn new() -> FakeHost {
        FakeHost::default()
    }

    pub fn with_review(mut self, org: &str, repo: &str, review: Review) -> FakeHost {
        self.reviews
            .insert((org.to_string(), repo.to_string(), review.number), review);
        self
    }

    pub fn with_merged(mut self, org: &str, repo: &str, number: u64) -> FakeHost {
        self.merged
            .insert((org.to_string(), repo.to_string(), number));
        self
    }

    pub fn with_commits(
        mut self,
        org: &str,
        repo: &str,
        number: u64,
        commits: Vec<Commit>,
    ) -> FakeHost {
        self.commits
            .insert((org.to_string(), repo.to_string(), number), commits);
        self
    }

    pub fn with_commit_pulls(
        mut self,
        org: &str,
        repo: &str,
        sha: &str,
        pulls: Vec<Review>,
    ) -> FakeHost {
        self.commit_pulls
            .insert((org.to_string(), repo.to_string(), sha.to_string()), pulls);
        self
    }

    pub fn with_history(mut self, org: &str, repo: &str, reviews: Vec<Review>) -> FakeHost {
        self.history
            .insert((org.to_string(), repo.to_string()), reviews);
        self
    }

    pub fn with_missing_repo(mut self, org: &str, repo: &str) -> FakeHost {
        self.missing_repos
            .insert((org.to_string(), repo.to_string()));
        self
    }

    pub fn with_build_delay(mut self, delay: Duration) -> FakeHost {
        self.build_delay = Some(delay);
        self
    }

    /// Fail the next `count` history enumerations before serving any page.
    pub fn with_failing_enumerations(self, count: usize) -> FakeHost {
        self.fail_enumerations.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl CodeHost for FakeHost {
    async fn get_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Review, CodeHostError> {
        self.reviews
            .get(&(org.to_string(), repo.to_string(), number))
            .cloned()
            .ok_or_else(|| {
                CodeHostError::NotFound(format!("pull request {}/{}#{}", org, repo, number))
            })
    }

    async fn is_merged(&self, org: &str, repo: &str, number: u64) -> Result<bool, CodeHostError> {
        Ok(self
            .merged
            .contains(&(org.to_string(), repo.to_string(), number)))
    }

    async fn list_commits(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, CodeHostError> {
        self.commit_lists.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .commits
            .get(&(org.to_string(), repo.to_string(), number))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_reviews_containing_commit(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<Review>, CodeHostError> {
        self.commit_searches.fetch_add(1, Ordering::SeqCst);
        if self
            .missing_repos
            .contains(&(org.to_string(), repo.to_string()))
        {
            return Err(CodeHostError::NotFound(format!(
                "repository {}/{}",
                org, repo
            )));
        }
        Ok(self
            .commit_pulls
            .get(&(org.to_string(), repo.to_string(), sha.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_all_reviews(
        &self,
        org: &str,
        repo: &str,
        page: Option<u32>,
    ) -> Result<(Vec<Review>, Option<u32>), CodeHostError> {
        if page.is_none() {
            self.enumerations.fetch_add(1, Ordering::SeqCst);
            if self
                .fail_enumerations
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                    remaining.checked_sub(1)
                })
                .is_ok()
            {
                return Err(CodeHostError::UnexpectedStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    url: format!("fake://{}/{}/pulls", org, repo),
                });
            }
        }
        if let Some(delay) = self.build_delay {
            tokio::time::sleep(delay).await;
        }

        let all = self
            .history
            .get(&(org.to_string(), repo.to_string()))
            .cloned()
            .unwrap_or_default();
        let page_number = page.unwrap_or(1) as usize;
        let start = (page_number - 1) * FAKE_PAGE_SIZE;
        let batch: Vec<Review> = all.iter().skip(start).take(FAKE_PAGE_SIZE).cloned().collect();
        let next = if start + batch.len() < all.len() {
            Some(page_number as u32 + 1)
        } else {
            None
        };
        Ok((batch, next))
    }
}
