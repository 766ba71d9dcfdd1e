use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{IssueTracker, ItemSummary, ItemType, ParentField, TrackerError, WorkItem};

/// Jira REST v2 client with basic auth.
pub struct JiraTracker {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl JiraTracker {
    pub fn new(base_url: &str, user: &str, password: &str) -> JiraTracker {
        JiraTracker {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn get_item(&self, key: &str) -> Result<WorkItem, TrackerError> {
        #[derive(serde::Deserialize)]
        struct IssueResponse {
            key: String,
            fields: IssueFields,
        }

        #[derive(serde::Deserialize)]
        struct IssueFields {
            summary: String,
            status: NamedField,
            issuetype: NamedField,
            description: Option<String>,
            comment: Option<CommentPage>,
            #[serde(default)]
            subtasks: Vec<SubtaskRef>,
        }

        #[derive(serde::Deserialize)]
        struct NamedField {
            name: String,
        }

        #[derive(serde::Deserialize)]
        struct CommentPage {
            comments: Vec<CommentBody>,
        }

        #[derive(serde::Deserialize)]
        struct CommentBody {
            body: String,
        }

        #[derive(serde::Deserialize)]
        struct SubtaskRef {
            key: String,
        }

        let url = format!("{}/rest/api/2/issue/{}", self.base_url, key);
        debug!(key, "fetching work item from tracker");
        let response = self
            .get(&url)
            .query(&[(
                "fields",
                "summary,status,issuetype,description,comment,subtasks",
            )])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound(key.to_string()));
        }

        let issue = response
            .error_for_status()?
            .json::<IssueResponse>()
            .await?;

        Ok(WorkItem {
            key: issue.key,
            item_type: ItemType::from_name(&issue.fields.issuetype.name),
            status: issue.fields.status.name,
            summary: issue.fields.summary,
            description: issue.fields.description.unwrap_or_default(),
            comments: issue
                .fields
                .comment
                .map(|page| page.comments.into_iter().map(|c| c.body).collect())
                .unwrap_or_default(),
            subtask_keys: issue.fields.subtasks.into_iter().map(|s| s.key).collect(),
        })
    }

    async fn search_by_parent_link(
        &self,
        field: ParentField,
        key: &str,
    ) -> Result<Vec<ItemSummary>, TrackerError> {
        #[derive(serde::Deserialize)]
        struct SearchResponse {
            issues: Vec<SearchIssue>,
        }

        #[derive(serde::Deserialize)]
        struct SearchIssue {
            key: String,
            fields: SearchFields,
        }

        #[derive(serde::Deserialize)]
        struct SearchFields {
            summary: String,
        }

        let url = format!("{}/rest/api/2/search", self.base_url);
        let jql = format!("\"{}\" = {}", field.field_name(), key);
        debug!(%jql, "searching tracker for child items");
        let response = self
            .get(&url)
            .query(&[("jql", jql.as_str()), ("fields", "summary")])
            .send()
            .await?
            .error_for_status()?;

        let found = response.json::<SearchResponse>().await?;
        Ok(found
            .issues
            .into_iter()
            .map(|issue| ItemSummary {
                key: issue.key,
                summary: issue.fields.summary,
            })
            .collect())
    }
}
