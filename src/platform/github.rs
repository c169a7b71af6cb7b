//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeResult, Platform, PullRequest, RepoRef, ReviewRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
}

impl GitHubService {
    /// Create a new GitHub service against `api_endpoint`
    pub fn new(token: &str, api_endpoint: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_endpoint)
            .map_err(|e| Error::github(e.to_string()))?
            .build()
            .map_err(|e| Error::github(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_existing_pr(
        &self,
        repo: &RepoRef,
        head_branch: &str,
    ) -> Result<Option<PullRequest>> {
        debug!(%repo, head_branch, "finding existing PR");
        let head = format!("{}:{}", repo.namespace, head_branch);

        let prs = self
            .client
            .pulls(&repo.namespace, &repo.name)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found existing PR");
        } else {
            debug!("no existing PR found");
        }
        Ok(result)
    }

    async fn create_pr(&self, repo: &RepoRef, request: &ReviewRequest) -> Result<PullRequest> {
        debug!(%repo, head = %request.head, base = %request.base, "creating PR");
        let pulls = self.client.pulls(&repo.namespace, &repo.name);
        let mut builder = pulls.create(&request.title, &request.head, &request.base);

        if let Some(body_text) = &request.body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;
        let result = pr_from_octocrab(&pr);

        // Labels live on the issue side of the PR
        if let Some(label) = &request.label {
            self.client
                .issues(&repo.namespace, &repo.name)
                .add_labels(result.number, &[label.clone()])
                .await?;
            debug!(pr_number = result.number, %label, "labelled PR");
        }

        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn merge_pr(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        debug!(%repo, pr_number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&repo.namespace, &repo.name)
            .merge(pr_number)
            .method(octocrab_method)
            .send()
            .await?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    fn platform(&self) -> Platform {
        Platform::GitHub
    }
}
