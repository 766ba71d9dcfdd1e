use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tracing::{debug, error};

use crate::engine::cache::RepoReferenceCache;
use crate::engine::types::{ItemResult, LinkResult, ReferenceStatus};
use crate::engine::{matcher, resolver, EngineError};
use crate::github::CodeHost;
use crate::links::{self, ReferenceLink};
use crate::tracker::{IssueTracker, ItemType, ParentField, WorkItem};

/// Maximum in-flight workers per fan-out point. Keeps very wide trees from
/// holding one remote request per node at once.
const FAN_OUT_WIDTH: usize = 8;

/// Recursive, concurrent walk of work item trees: each item's sibling links
/// and sibling children fan out concurrently, and the assembled tree keeps
/// the original request order regardless of completion order.
pub struct Walker {
    tracker: Arc<dyn IssueTracker>,
    host: Arc<dyn CodeHost>,
    cache: RepoReferenceCache,
    downstream_org: String,
}

impl Walker {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        host: Arc<dyn CodeHost>,
        downstream_org: &str,
    ) -> Walker {
        Walker {
            tracker,
            host,
            cache: RepoReferenceCache::new(),
            downstream_org: downstream_org.to_string(),
        }
    }

    /// Walk every requested root item. A failed root is reported and
    /// omitted; the surviving trees keep the request order.
    pub async fn walk_all(&self, keys: &[String]) -> Vec<ItemResult> {
        self.walk_many(keys).await
    }

    /// Walk one work item into its result tree. Fails only for this item;
    /// descendants that fail are reported and omitted from `children`.
    pub fn walk<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<ItemResult, EngineError>> {
        Box::pin(async move {
            debug!(key, "walking work item");
            let item = self
                .tracker
                .get_item(key)
                .await
                .map_err(|source| EngineError::ItemFetch {
                    key: key.to_string(),
                    source,
                })?;

            let urls = links::extract_links(&item);
            let link_results = self.process_links(&urls).await;

            let child_keys = self.child_keys(&item).await?;
            let children = self.walk_many(&child_keys).await;

            Ok(ItemResult {
                item,
                links: link_results,
                children,
            })
        })
    }

    /// Concurrently walk sibling items, deduplicated per parent, results
    /// reassembled in first-occurrence order.
    async fn walk_many(&self, keys: &[String]) -> Vec<ItemResult> {
        let unique = links::unique_in_order(keys);
        let completed: Vec<(String, Result<ItemResult, EngineError>)> =
            stream::iter(unique.clone())
                .map(|key| async move {
                    let result = self.walk(&key).await;
                    (key, result)
                })
                .buffer_unordered(FAN_OUT_WIDTH)
                .collect()
                .await;

        let mut by_key: HashMap<String, ItemResult> = HashMap::new();
        for (key, result) in completed {
            match result {
                Ok(item_result) => {
                    by_key.insert(key, item_result);
                }
                Err(err) => error!(%key, error = %err, "failed to walk work item"),
            }
        }
        unique
            .into_iter()
            .filter_map(|key| by_key.remove(&key))
            .collect()
    }

    /// Child keys by item-type rule: Epic and Feature search by their
    /// parent-link field, Story uses its declared subtasks, everything else
    /// has no children.
    async fn child_keys(&self, item: &WorkItem) -> Result<Vec<String>, EngineError> {
        let field = match &item.item_type {
            ItemType::Epic => ParentField::EpicLink,
            ItemType::Feature => ParentField::ParentLink,
            ItemType::Story => return Ok(item.subtask_keys.clone()),
            _ => return Ok(Vec::new()),
        };

        let summaries = self
            .tracker
            .search_by_parent_link(field, &item.key)
            .await
            .map_err(|source| EngineError::ChildSearch {
                key: item.key.clone(),
                source,
            })?;
        Ok(summaries.into_iter().map(|summary| summary.key).collect())
    }

    /// Concurrently resolve and match sibling links, deduplicated, results
    /// reassembled in extraction order. A failed link is reported and
    /// omitted; its siblings still complete.
    async fn process_links(&self, urls: &[String]) -> Vec<LinkResult> {
        let unique = links::unique_in_order(urls);
        let completed: Vec<(String, Result<LinkResult, EngineError>)> =
            stream::iter(unique.clone())
                .map(|url| async move {
                    let result = self.process_one_link(&url).await;
                    (url, result)
                })
                .buffer_unordered(FAN_OUT_WIDTH)
                .collect()
                .await;

        let mut by_url: HashMap<String, LinkResult> = HashMap::new();
        for (url, result) in completed {
            match result {
                Ok(link_result) => {
                    by_url.insert(url, link_result);
                }
                Err(err) => error!(%url, error = %err, "failed to get pull request details"),
            }
        }
        unique
            .into_iter()
            .filter_map(|url| by_url.remove(&url))
            .collect()
    }

    async fn process_one_link(&self, url: &str) -> Result<LinkResult, EngineError> {
        let link = ReferenceLink::parse(url)?;
        let reference = resolver::resolve(self.host.as_ref(), link).await?;

        if reference.link.org == self.downstream_org {
            // Already a downstream reference; nothing to match.
            return Ok(LinkResult {
                reference,
                downstream: Vec::new(),
            });
        }

        if reference.status == ReferenceStatus::Closed {
            // An upstream change closed without merging has no downstream
            // counterpart worth looking for.
            return Ok(LinkResult {
                reference,
                downstream: Vec::new(),
            });
        }

        let commits = self
            .host
            .list_commits(
                &reference.link.org,
                &reference.link.repo,
                reference.link.number,
            )
            .await
            .map_err(|source| EngineError::CommitList {
                url: reference.link.url.clone(),
                source,
            })?;

        let downstream = matcher::find_downstream(
            self.host.as_ref(),
            &self.cache,
            &reference,
            &commits,
            &self.downstream_org,
        )
        .await?;

        Ok(LinkResult {
            reference,
            downstream,
        })
    }
}
