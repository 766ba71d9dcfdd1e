pub mod jira;
pub mod types;

pub use jira::JiraTracker;
pub use types::{ItemSummary, ItemType, WorkItem};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("work item {0} not found")]
    NotFound(String),

    #[error("issue tracker request failed: {0}")]
    Api(#[from] reqwest::Error),
}

/// Linkage field naming a work item's parent, by parent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentField {
    EpicLink,
    ParentLink,
}

impl ParentField {
    /// Field name as it appears in the tracker's query language.
    pub fn field_name(&self) -> &'static str {
        match self {
            ParentField::EpicLink => "Epic Link",
            ParentField::ParentLink => "Parent Link",
        }
    }
}

/// Read-only client for the issue tracker. Implementations are injected;
/// the engine never constructs its own transport or credentials.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one work item snapshot, including description and comments.
    async fn get_item(&self, key: &str) -> Result<WorkItem, TrackerError>;

    /// Find items whose parent-link field equals `key`, in response order.
    async fn search_by_parent_link(
        &self,
        field: ParentField,
        key: &str,
    ) -> Result<Vec<ItemSummary>, TrackerError>;
}
