pub mod cache;
pub mod matcher;
pub mod resolver;
pub mod types;
pub mod walker;

pub use cache::RepoReferenceCache;
pub use types::{ItemResult, LinkResult, ReferenceStatus, ResolvedReference};
pub use walker::Walker;

use thiserror::Error;

use crate::github::CodeHostError;
use crate::links::LinkError;
use crate::tracker::TrackerError;

/// Engine failures, each carrying the operation and identifier that failed so
/// a partial tree can be traced back to its gap.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not fetch work item {key}: {source}")]
    ItemFetch { key: String, source: TrackerError },

    #[error("could not find child items of {key}: {source}")]
    ChildSearch { key: String, source: TrackerError },

    #[error("could not fetch pull request {url}: {source}")]
    ReviewFetch { url: String, source: CodeHostError },

    #[error("could not fetch merge status of {url}: {source}")]
    MergeCheck { url: String, source: CodeHostError },

    #[error("could not list commits in pull request {url}: {source}")]
    CommitList { url: String, source: CodeHostError },

    #[error("could not find downstream pull requests for commit {sha}: {source}")]
    CommitSearch { sha: String, source: CodeHostError },

    #[error("could not get pull requests for {repo_key}: {source}")]
    SnapshotList {
        repo_key: String,
        source: CodeHostError,
    },

    #[error("could not get commits for pull request {number}: {source}")]
    SnapshotCommits { number: u64, source: CodeHostError },

    #[error(transparent)]
    Link(#[from] LinkError),
}
