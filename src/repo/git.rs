//! `git` command-line implementation of [`RepositoryOps`]

use super::RepositoryOps;
use crate::error::{Error, Result};
use crate::types::RepoRef;
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Drives the system `git` binary
///
/// Authentication is whatever git itself is configured with (SSH keys,
/// credential helpers).
#[derive(Debug, Clone)]
pub struct GitCli {
    base_uri: String,
}

impl GitCli {
    /// Create a git driver cloning from `base_uri`
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
        }
    }

    /// Clone URL for a repository
    pub fn clone_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/{}/{}.git",
            self.base_uri.trim_end_matches('/'),
            repo.namespace,
            repo.name
        )
    }

    async fn run(&self, operation: &'static str, dir: Option<&Path>, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        debug!(operation, ?args, "running git");
        cmd.output().await.map_err(|e| Error::Vcs {
            operation,
            message: e.to_string(),
        })
    }

    async fn run_checked(&self, operation: &'static str, dir: Option<&Path>, args: &[&str]) -> Result<()> {
        let output = self.run(operation, dir, args).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Vcs {
                operation,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl RepositoryOps for GitCli {
    fn is_present(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    async fn clone_repo(&self, repo: &RepoRef, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let url = self.clone_url(repo);
        let target = path.to_string_lossy();
        self.run_checked("clone", None, &["clone", url.as_str(), target.as_ref()])
            .await
    }

    async fn fetch_updates(&self, path: &Path, remote: &str, target_branch: &str) -> Result<()> {
        self.run_checked("fetch", Some(path), &["fetch", "--prune", remote])
            .await?;

        // Local target branch always mirrors the remote one
        let upstream = format!("{remote}/{target_branch}");
        self.run_checked(
            "checkout",
            Some(path),
            &["checkout", "-B", target_branch, upstream.as_str()],
        )
        .await
    }

    async fn checkout_branch(&self, path: &Path, branch: &str, start_point: &str) -> Result<()> {
        self.run_checked(
            "checkout",
            Some(path),
            &["checkout", "-B", branch, start_point],
        )
        .await
    }

    async fn stage_files(&self, path: &Path) -> Result<()> {
        self.run_checked("add", Some(path), &["add", "--all"])
            .await
    }

    async fn commit_staged_files(&self, path: &Path, branch: &str, message: &str) -> Result<bool> {
        // `diff --cached --quiet` exits 0 when nothing is staged, 1 otherwise
        let diff = self
            .run("diff", Some(path), &["diff", "--cached", "--quiet"])
            .await?;
        match diff.status.code() {
            Some(0) => {
                debug!(branch, "nothing staged to commit");
                return Ok(false);
            }
            Some(1) => {}
            _ => {
                return Err(Error::Vcs {
                    operation: "diff",
                    message: String::from_utf8_lossy(&diff.stderr).trim().to_string(),
                });
            }
        }

        self.run_checked("commit", Some(path), &["commit", "-m", message])
            .await?;
        debug!(branch, "committed staged files");
        Ok(true)
    }

    async fn push_branch(&self, path: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run_checked("push", Some(path), &["push", "--force-with-lease", "--set-upstream", remote, branch])
            .await
    }
}
