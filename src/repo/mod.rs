//! Repository operations
//!
//! The state machine only talks to git through [`RepositoryOps`], so tests can
//! substitute a recording stub for the real [`GitCli`].

mod git;

pub use git::GitCli;

use crate::error::Result;
use crate::types::RepoRef;
use async_trait::async_trait;
use std::path::Path;

/// Clone/fetch/stage/commit/push operations on a module's working copy
#[async_trait]
pub trait RepositoryOps: Send + Sync {
    /// Whether a working copy already exists at `path`
    fn is_present(&self, path: &Path) -> bool;

    /// Clone `repo` into `path`
    async fn clone_repo(&self, repo: &RepoRef, path: &Path) -> Result<()>;

    /// Fetch `remote` and move the working copy onto the tip of
    /// `remote/target_branch`
    ///
    /// Whatever branch an earlier run left checked out is irrelevant, so a
    /// working branch deleted upstream never blocks an update.
    async fn fetch_updates(&self, path: &Path, remote: &str, target_branch: &str) -> Result<()>;

    /// Switch to `branch`, (re)created at `start_point`
    ///
    /// Uncommitted changes are carried over.
    async fn checkout_branch(&self, path: &Path, branch: &str, start_point: &str) -> Result<()>;

    /// Stage every changed file
    async fn stage_files(&self, path: &Path) -> Result<()>;

    /// Commit staged files on `branch`
    ///
    /// Returns `false` when there was nothing to commit.
    async fn commit_staged_files(&self, path: &Path, branch: &str, message: &str) -> Result<bool>;

    /// Push `branch` to `remote`
    async fn push_branch(&self, path: &Path, remote: &str, branch: &str) -> Result<()>;
}
