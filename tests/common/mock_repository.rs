//! Mock repository operations for testing

#![allow(dead_code)]

use async_trait::async_trait;
use modsync::error::{Error, Result};
use modsync::repo::RepositoryOps;
use modsync::types::RepoRef;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded repository call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Clone { repo: String, path: PathBuf },
    Fetch { path: PathBuf, remote: String, target_branch: String },
    Checkout { path: PathBuf, branch: String, start_point: String },
    Stage(PathBuf),
    Commit { path: PathBuf, branch: String, message: String },
    Push { path: PathBuf, remote: String, branch: String },
}

/// Recording stand-in for git
///
/// Clones mark the path present. `commit_staged_files` reports whatever
/// `set_has_changes` configured (default: changes present).
pub struct MockRepository {
    present: Mutex<HashSet<PathBuf>>,
    has_changes: Mutex<bool>,
    calls: Mutex<Vec<RepoCall>>,
    failing: Mutex<HashSet<&'static str>>,
    failing_paths: Mutex<HashSet<PathBuf>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            present: Mutex::new(HashSet::new()),
            has_changes: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            failing_paths: Mutex::new(HashSet::new()),
        }
    }

    /// Pretend a working copy already exists at `path`
    pub fn mark_present(&self, path: impl Into<PathBuf>) {
        self.present.lock().unwrap().insert(path.into());
    }

    /// Configure whether the next commits find anything staged
    pub fn set_has_changes(&self, has_changes: bool) {
        *self.has_changes.lock().unwrap() = has_changes;
    }

    /// Make an operation ("clone", "fetch", "checkout", "add", "commit", "push") fail
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    /// Make every operation on `path` fail
    pub fn fail_path(&self, path: impl Into<PathBuf>) {
        self.failing_paths.lock().unwrap().insert(path.into());
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clone_count(&self) -> usize {
        self.count(|c| matches!(c, RepoCall::Clone { .. }))
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, RepoCall::Fetch { .. }))
    }

    pub fn commit_count(&self) -> usize {
        self.count(|c| matches!(c, RepoCall::Commit { .. }))
    }

    /// Number of staging or committing calls
    pub fn stage_or_commit_count(&self) -> usize {
        self.count(|c| matches!(c, RepoCall::Stage(_) | RepoCall::Commit { .. }))
    }

    fn count(&self, pred: impl Fn(&RepoCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, operation: &'static str, path: &Path, call: RepoCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(operation)
            || self.failing_paths.lock().unwrap().contains(path)
        {
            return Err(Error::Vcs {
                operation,
                message: format!("simulated {operation} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryOps for MockRepository {
    fn is_present(&self, path: &Path) -> bool {
        self.present.lock().unwrap().contains(path)
    }

    async fn clone_repo(&self, repo: &RepoRef, path: &Path) -> Result<()> {
        self.record(
            "clone",
            path,
            RepoCall::Clone {
                repo: repo.full_path(),
                path: path.to_path_buf(),
            },
        )?;
        self.mark_present(path);
        Ok(())
    }

    async fn fetch_updates(&self, path: &Path, remote: &str, target_branch: &str) -> Result<()> {
        self.record(
            "fetch",
            path,
            RepoCall::Fetch {
                path: path.to_path_buf(),
                remote: remote.to_string(),
                target_branch: target_branch.to_string(),
            },
        )
    }

    async fn checkout_branch(&self, path: &Path, branch: &str, start_point: &str) -> Result<()> {
        self.record(
            "checkout",
            path,
            RepoCall::Checkout {
                path: path.to_path_buf(),
                branch: branch.to_string(),
                start_point: start_point.to_string(),
            },
        )
    }

    async fn stage_files(&self, path: &Path) -> Result<()> {
        self.record("add", path, RepoCall::Stage(path.to_path_buf()))
    }

    async fn commit_staged_files(&self, path: &Path, branch: &str, message: &str) -> Result<bool> {
        self.record(
            "commit",
            path,
            RepoCall::Commit {
                path: path.to_path_buf(),
                branch: branch.to_string(),
                message: message.to_string(),
            },
        )?;
        Ok(*self.has_changes.lock().unwrap())
    }

    async fn push_branch(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record(
            "push",
            path,
            RepoCall::Push {
                path: path.to_path_buf(),
                remote: remote.to_string(),
                branch: branch.to_string(),
            },
        )
    }
}
