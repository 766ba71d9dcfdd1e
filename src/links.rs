use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::tracker::WorkItem;

/// Shape of a GitHub pull request URL. Compiled once for the whole process.
static PULL_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/(?P<org>[^/]+)/(?P<repo>[^/]+)/pull/(?P<id>\d+)")
        .expect("pull request URL regex should be valid")
});

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("not a pull request URL: {0}")]
    InvalidUrl(String),

    #[error("could not parse pull request id in {url}")]
    InvalidId { url: String },
}

/// A parsed pointer to one pull request. Two links with the same URL are the
/// same link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceLink {
    pub org: String,
    pub repo: String,
    pub number: u64,
    /// Canonical URL, exactly the text the pattern matched.
    pub url: String,
}

impl ReferenceLink {
    /// Parse a pull request URL into its component parts.
    pub fn parse(url: &str) -> Result<ReferenceLink, LinkError> {
        let captures = PULL_URL_PATTERN
            .captures(url)
            .ok_or_else(|| LinkError::InvalidUrl(url.to_string()))?;

        let number = captures["id"]
            .parse::<u64>()
            .map_err(|_| LinkError::InvalidId {
                url: url.to_string(),
            })?;

        Ok(ReferenceLink {
            org: captures["org"].to_string(),
            repo: captures["repo"].to_string(),
            number,
            url: captures[0].to_string(),
        })
    }
}

/// Extract every pull request URL referenced by a work item's free text,
/// deduplicated, in first-occurrence order: description first, then each
/// comment in its original order. No references is a valid, empty result.
pub fn extract_links(item: &WorkItem) -> Vec<String> {
    let mut urls = Vec::new();

    for found in PULL_URL_PATTERN.find_iter(&item.description) {
        urls.push(found.as_str().to_string());
    }
    for comment in &item.comments {
        for found in PULL_URL_PATTERN.find_iter(comment) {
            urls.push(found.as_str().to_string());
        }
    }

    unique_in_order(&urls)
}

/// Deduplicate while preserving first-occurrence order.
pub(crate) fn unique_in_order(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|value| seen.insert(value.as_str()))
        .cloned()
        .collect()
}
