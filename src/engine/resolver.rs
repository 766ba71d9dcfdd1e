use tracing::debug;

use crate::engine::types::{ReferenceStatus, ResolvedReference};
use crate::engine::EngineError;
use crate::github::CodeHost;
use crate::links::ReferenceLink;

/// Resolve one reference link to its current pull request status.
///
/// The merge flag is queried separately because the raw pull request state
/// does not reliably distinguish "closed because merged" from "closed and
/// abandoned" on all API versions; merged overrides any raw state.
pub async fn resolve(
    host: &dyn CodeHost,
    link: ReferenceLink,
) -> Result<ResolvedReference, EngineError> {
    debug!(url = %link.url, "resolving pull request reference");
    let review = host
        .get_review(&link.org, &link.repo, link.number)
        .await
        .map_err(|source| EngineError::ReviewFetch {
            url: link.url.clone(),
            source,
        })?;

    let merged = host
        .is_merged(&link.org, &link.repo, link.number)
        .await
        .map_err(|source| EngineError::MergeCheck {
            url: link.url.clone(),
            source,
        })?;

    let status = if merged {
        ReferenceStatus::Merged
    } else if review.state == "open" {
        ReferenceStatus::Open
    } else {
        ReferenceStatus::Closed
    };

    Ok(ResolvedReference {
        link,
        status,
        title: review.title,
        base_branch: review.base_branch,
    })
}
