/// Category of a work item, driving the child-discovery rule during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemType {
    Epic,
    Feature,
    Story,
    Task,
    Other(String),
}

impl ItemType {
    pub fn from_name(name: &str) -> ItemType {
        match name {
            "Epic" => ItemType::Epic,
            "Feature" => ItemType::Feature,
            "Story" => ItemType::Story,
            "Task" => ItemType::Task,
            other => ItemType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Epic => write!(f, "Epic"),
            ItemType::Feature => write!(f, "Feature"),
            ItemType::Story => write!(f, "Story"),
            ItemType::Task => write!(f, "Task"),
            ItemType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Immutable snapshot of one tracked work item, fetched once per tree node.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Tracker key (e.g., "PROJ-1234")
    pub key: String,
    pub item_type: ItemType,
    /// Workflow status name as reported by the tracker
    pub status: String,
    pub summary: String,
    /// Free-text description; empty when the item has none
    pub description: String,
    /// Comment bodies in their original order
    pub comments: Vec<String>,
    /// Keys of declared subtasks, in response order
    pub subtask_keys: Vec<String>,
}

/// Abbreviated search hit. Comments are not included; the walker fetches the
/// full item when it needs link text.
#[derive(Debug, Clone)]
pub struct ItemSummary {
    pub key: String,
    #[allow(dead_code)]
    pub summary: String,
}
