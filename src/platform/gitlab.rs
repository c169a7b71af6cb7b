//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeResult, Platform, PullRequest, RepoRef, ReviewRequest};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    api_endpoint: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
}

/// Merge response
#[derive(Deserialize)]
struct MergeResponse {
    state: String,
    merge_commit_sha: Option<String>,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
        }
    }
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a str>,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GitLabService {
    /// Create a new GitLab service against `api_endpoint`
    /// (e.g. `https://gitlab.com/api/v4`)
    pub fn new(token: String, api_endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::gitlab(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_endpoint, path)
    }

    fn merge_requests_url(repo: &RepoRef) -> String {
        format!(
            "/projects/{}/merge_requests",
            urlencoding::encode(&repo.full_path())
        )
    }
}

/// Turn a non-success response into a platform error carrying its status
async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::PlatformApi {
        platform: Platform::GitLab,
        status: Some(status.as_u16()),
        message: format!("{context}: {}", body.trim()),
    })
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn find_existing_pr(
        &self,
        repo: &RepoRef,
        head_branch: &str,
    ) -> Result<Option<PullRequest>> {
        debug!(%repo, head_branch, "finding existing MR");
        let url = self.api_url(&Self::merge_requests_url(repo));

        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("source_branch", head_branch), ("state", "opened")])
            .send()
            .await?;
        let mrs: Vec<MergeRequest> = check_status(response, "listing merge requests")
            .await?
            .json()
            .await?;

        let result: Option<PullRequest> = mrs.into_iter().next().map(Into::into);
        if let Some(ref pr) = result {
            debug!(mr_iid = pr.number, "found existing MR");
        } else {
            debug!("no existing MR found");
        }
        Ok(result)
    }

    async fn create_pr(&self, repo: &RepoRef, request: &ReviewRequest) -> Result<PullRequest> {
        debug!(%repo, head = %request.head, base = %request.base, "creating MR");
        let url = self.api_url(&Self::merge_requests_url(repo));

        let payload = CreateMrPayload {
            source_branch: &request.head,
            target_branch: &request.base,
            title: &request.title,
            description: request.body.as_deref(),
            labels: request.label.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?;
        let mr: MergeRequest = check_status(response, "creating merge request")
            .await?
            .json()
            .await?;

        let pr: PullRequest = mr.into();
        debug!(mr_iid = pr.number, "created MR");
        Ok(pr)
    }

    async fn merge_pr(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        debug!(%repo, mr_iid = pr_number, %method, "merging MR");
        let url = self.api_url(&format!(
            "{}/{}/merge",
            Self::merge_requests_url(repo),
            pr_number
        ));

        let body = match method {
            MergeMethod::Squash => serde_json::json!({ "squash": true }),
            MergeMethod::Merge => serde_json::json!({}),
            MergeMethod::Rebase => serde_json::json!({ "merge_method": "rebase" }),
        };

        let response = self
            .client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&body)
            .send()
            .await?;
        let response: MergeResponse = check_status(response, "Merge failed")
            .await?
            .json()
            .await?;

        let merge_result = MergeResult {
            merged: response.state == "merged",
            sha: response.merge_commit_sha,
            message: None,
        };

        debug!(
            mr_iid = pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    fn platform(&self) -> Platform {
        Platform::GitLab
    }
}
