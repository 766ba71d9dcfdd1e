use std::collections::HashSet;

use tracing::{debug, warn};

use crate::engine::cache::RepoReferenceCache;
use crate::engine::types::{LinkResult, ResolvedReference};
use crate::engine::{resolver, EngineError};
use crate::github::{CodeHost, CodeHostError, Commit};
use crate::links::ReferenceLink;

/// Find the downstream pull requests corresponding to one upstream reference.
///
/// For each upstream commit, in order: ask the code host directly for
/// downstream pull requests containing that commit; while no direct match has
/// turned up at all, also scan the cached repository history for commit
/// messages carrying the SHA (the trace a cherry-pick leaves behind). An
/// empty result is a valid outcome, not an error.
pub async fn find_downstream(
    host: &dyn CodeHost,
    cache: &RepoReferenceCache,
    upstream: &ResolvedReference,
    commits: &[Commit],
    downstream_org: &str,
) -> Result<Vec<LinkResult>, EngineError> {
    let repo = &upstream.link.repo;
    let mut seen_numbers: HashSet<u64> = HashSet::new();
    let mut matched_urls: Vec<String> = Vec::new();

    for commit in commits {
        let candidates = match host
            .list_reviews_containing_commit(downstream_org, repo, &commit.sha)
            .await
        {
            Ok(candidates) => candidates,
            Err(CodeHostError::NotFound(_)) => {
                // The repository has not been forked downstream; nothing to
                // match against.
                debug!(org = downstream_org, repo = %repo, "no downstream repository, skipping");
                break;
            }
            Err(source) => {
                return Err(EngineError::CommitSearch {
                    sha: commit.sha.clone(),
                    source,
                })
            }
        };

        for candidate in candidates {
            if candidate.html_url == upstream.link.url {
                // The API echoes the source pull request when querying by a
                // shared commit.
                continue;
            }
            if !seen_numbers.insert(candidate.number) {
                continue;
            }
            matched_urls.push(candidate.html_url);
        }

        if seen_numbers.is_empty() {
            let snapshot = cache.get_snapshot(host, downstream_org, repo).await?;
            for entry in &snapshot.reviews {
                if !entry
                    .commits
                    .iter()
                    .any(|c| c.message.contains(&commit.sha))
                {
                    continue;
                }
                if !seen_numbers.insert(entry.review.number) {
                    continue;
                }
                matched_urls.push(entry.review.html_url.clone());
            }
        }
    }

    let mut results = Vec::with_capacity(matched_urls.len());
    for url in matched_urls {
        match resolve_match(host, &url).await {
            Ok(link_result) => results.push(link_result),
            Err(err) => warn!(%url, error = %err, "failed to resolve matched downstream pull request"),
        }
    }
    Ok(results)
}

async fn resolve_match(host: &dyn CodeHost, url: &str) -> Result<LinkResult, EngineError> {
    let link = ReferenceLink::parse(url)?;
    let reference = resolver::resolve(host, link).await?;
    Ok(LinkResult {
        reference,
        downstream: Vec::new(),
    })
}
