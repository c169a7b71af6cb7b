//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use modsync::error::{Error, Result};
use modsync::platform::PlatformService;
use modsync::types::{
    MergeMethod, MergeResult, Platform, PullRequest, RepoRef, ReviewRequest,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub repo: String,
    pub request: ReviewRequest,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub repo: String,
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Configurable existing PRs per branch
/// - Error injection for failure path testing
pub struct MockPlatformService {
    platform: Platform,
    next_pr_number: AtomicU64,
    existing_prs: Mutex<HashMap<String, PullRequest>>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_create_pr: Mutex<Option<String>>,
    error_on_merge_pr: Mutex<Option<String>>,
    refuse_merge: Mutex<bool>,
}

impl MockPlatformService {
    /// Create a new mock for GitHub
    pub fn new() -> Self {
        Self::for_platform(Platform::GitHub)
    }

    /// Create a new mock for a specific platform
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            next_pr_number: AtomicU64::new(1),
            existing_prs: Mutex::new(HashMap::new()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_merge_pr: Mutex::new(None),
            refuse_merge: Mutex::new(false),
        }
    }

    // === Error injection methods ===

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` return an error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` succeed at the API level but report not merged
    pub fn refuse_merge(&self) {
        *self.refuse_merge.lock().unwrap() = true;
    }

    /// Register an open PR for a head branch
    pub fn set_existing_pr(&self, branch: &str, number: u64) {
        self.existing_prs
            .lock()
            .unwrap()
            .insert(branch.to_string(), make_pr(number, branch, "main"));
    }

    // === Call verification methods ===

    /// Get all branches that `find_existing_pr` was called with
    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls
                .iter()
                .any(|c| c.request.head == head && c.request.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Get count of `create_pr` calls
    pub fn create_call_count(&self) -> usize {
        self.create_pr_calls.lock().unwrap().len()
    }

    /// Get count of `merge_pr` calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }
}

/// Build a PR fixture
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/test/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("PR for {head}"),
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_existing_pr(
        &self,
        _repo: &RepoRef,
        head_branch: &str,
    ) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());

        Ok(self.existing_prs.lock().unwrap().get(head_branch).cloned())
    }

    async fn create_pr(&self, repo: &RepoRef, request: &ReviewRequest) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            repo: repo.full_path(),
            request: request.clone(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::PlatformApi {
                platform: self.platform,
                status: Some(422),
                message: msg.clone(),
            });
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let mut pr = make_pr(number, &request.head, &request.base);
        pr.title.clone_from(&request.title);
        Ok(pr)
    }

    async fn merge_pr(
        &self,
        repo: &RepoRef,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            repo: repo.full_path(),
            pr_number,
            method,
        });

        // Check for injected error
        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::PlatformApi {
                platform: self.platform,
                status: Some(405),
                message: msg.clone(),
            });
        }

        if *self.refuse_merge.lock().unwrap() {
            return Ok(MergeResult {
                merged: false,
                sha: None,
                message: Some("Pull Request is not mergeable".to_string()),
            });
        }

        Ok(MergeResult {
            merged: true,
            sha: Some(format!("merged_sha_{pr_number}")),
            message: None,
        })
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
