/// Metadata about one pull request. Not Deserialize — constructed by the
/// client from the API response shape, and by tests directly.
#[derive(Debug, Clone)]
pub struct Review {
    pub number: u64,
    /// Raw state as reported by the API ("open" or "closed"). The raw state
    /// alone cannot distinguish merged from abandoned; see the resolver.
    pub state: String,
    pub html_url: String,
    pub title: String,
    /// Branch the pull request targets
    pub base_branch: String,
}

/// One commit inside a pull request.
#[derive(Debug, Clone)]
pub struct Commit {
    pub sha: String,
    pub message: String,
}
