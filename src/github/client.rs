use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{CodeHost, CodeHostError, Commit, Review};

const USER_AGENT: &str = "backport-tracker";
const PAGE_SIZE: usize = 50;

/// GitHub REST v3 client with bearer auth.
pub struct GitHubHost {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubHost {
    pub fn new(api_url: &str, token: &str) -> GitHubHost {
        GitHubHost {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
    }
}

#[derive(serde::Deserialize)]
struct PullResponse {
    number: u64,
    state: String,
    html_url: String,
    title: String,
    base: BaseRef,
}

#[derive(serde::Deserialize)]
struct BaseRef {
    #[serde(rename = "ref")]
    branch: String,
}

impl From<PullResponse> for Review {
    fn from(pull: PullResponse) -> Review {
        Review {
            number: pull.number,
            state: pull.state,
            html_url: pull.html_url,
            title: pull.title,
            base_branch: pull.base.branch,
        }
    }
}

#[derive(serde::Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
}

#[derive(serde::Deserialize)]
struct CommitDetail {
    message: String,
}

#[async_trait]
impl CodeHost for GitHubHost {
    async fn get_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Review, CodeHostError> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.api_url, org, repo, number);
        debug!(org, repo, number, "fetching pull request");
        let response = self.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CodeHostError::NotFound(format!(
                "pull request {}/{}#{}",
                org, repo, number
            )));
        }
        let pull = response
            .error_for_status()?
            .json::<PullResponse>()
            .await?;
        Ok(pull.into())
    }

    async fn is_merged(&self, org: &str, repo: &str, number: u64) -> Result<bool, CodeHostError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/merge",
            self.api_url, org, repo, number
        );
        debug!(org, repo, number, "checking merge status");
        let response = self.get(&url).send().await?;
        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => {
                response.error_for_status()?;
                Err(CodeHostError::UnexpectedStatus { status, url })
            }
        }
    }

    async fn list_commits(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, CodeHostError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/commits",
            self.api_url, org, repo, number
        );
        debug!(org, repo, number, "listing pull request commits");
        let entries = self
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CommitEntry>>()
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| Commit {
                sha: entry.sha,
                message: entry.commit.message,
            })
            .collect())
    }

    async fn list_reviews_containing_commit(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<Review>, CodeHostError> {
        let url = format!("{}/repos/{}/{}/commits/{}/pulls", self.api_url, org, repo, sha);
        debug!(org, repo, sha, "searching pull requests containing commit");
        let response = self.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CodeHostError::NotFound(format!("repository {}/{}", org, repo)));
        }
        let pulls = response
            .error_for_status()?
            .json::<Vec<PullResponse>>()
            .await?;
        Ok(pulls.into_iter().map(Review::from).collect())
    }

    async fn list_all_reviews(
        &self,
        org: &str,
        repo: &str,
        page: Option<u32>,
    ) -> Result<(Vec<Review>, Option<u32>), CodeHostError> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_url, org, repo);
        let page = page.unwrap_or(1);
        debug!(org, repo, page, "listing pull request history page");
        let per_page = PAGE_SIZE.to_string();
        let page_param = page.to_string();
        let pulls = self
            .get(&url)
            .query(&[
                ("state", "all"),
                ("per_page", per_page.as_str()),
                ("page", page_param.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<PullResponse>>()
            .await?;

        let next = if pulls.len() == PAGE_SIZE {
            Some(page + 1)
        } else {
            None
        };
        Ok((pulls.into_iter().map(Review::from).collect(), next))
    }
}
