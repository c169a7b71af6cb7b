//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for review request operations across
//! platforms. One client is built per process from the resolved
//! configuration and shared read-only by every module.

mod github;
mod gitlab;

pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::config::PlatformAccess;
use crate::error::Result;
use crate::types::{MergeMethod, MergeResult, Platform, PullRequest, RepoRef, ReviewRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Platform service trait for PR/MR operations
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// module workflow to work with either platform.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, repo: &RepoRef, head_branch: &str)
    -> Result<Option<PullRequest>>;

    /// Create a new PR, attaching the request's label when one is set
    async fn create_pr(&self, repo: &RepoRef, request: &ReviewRequest) -> Result<PullRequest>;

    /// Merge a PR with the specified method
    async fn merge_pr(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult>;

    /// Platform this service talks to
    fn platform(&self) -> Platform;
}

/// Build the platform service for `platform` from access settings
pub fn create_platform_service(
    platform: Platform,
    access: &PlatformAccess,
) -> Result<Arc<dyn PlatformService>> {
    let service: Arc<dyn PlatformService> = match platform {
        Platform::GitHub => Arc::new(GitHubService::new(
            &access.access_token,
            &access.api_endpoint,
        )?),
        Platform::GitLab => Arc::new(GitLabService::new(
            access.access_token.clone(),
            &access.api_endpoint,
        )?),
    };
    Ok(service)
}
