//! Core types for modsync

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported hosting platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl Platform {
    /// Every platform a configuration may select
    pub const SUPPORTED: [Self; 2] = [Self::GitHub, Self::GitLab];

    /// Lowercase identifier used in settings files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }

    /// Environment variable holding this platform's access token
    pub fn token_variable(self) -> String {
        format!("{}_TOKEN", self.as_str().to_uppercase())
    }

    /// Comma-separated identifiers of the supported platforms
    pub fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Platform {
    type Err = crate::error::Error;

    /// Parse a platform identifier
    ///
    /// Accepts any casing and a leading `:` so symbol-style values
    /// (`:gitlab`) resolve the same as plain ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches(':').to_ascii_lowercase();
        Self::SUPPORTED
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| crate::error::Error::UnsupportedPlatform {
                value: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Repository on the hosting platform, addressed by namespace and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Owning user, organization or group path
    pub namespace: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Create a new repository reference
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace/name` path as used by both platforms
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Parameters for opening a review request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Branch carrying the changes
    pub head: String,
    /// Branch the changes should land on
    pub base: String,
    /// Review request title
    pub title: String,
    /// Optional description
    pub body: Option<String>,
    /// Label to attach (None disables labelling)
    pub label: Option<String>,
}

/// A pull request / merge request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    #[default]
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl MergeMethod {
    /// All methods, in the order they are listed to users
    pub const ALL: [Self; 3] = [Self::Merge, Self::Squash, Self::Rebase];
}

impl FromStr for MergeMethod {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches(':').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.to_string() == normalized)
            .ok_or_else(|| crate::error::Error::InvalidSetting {
                key: "merge_method".to_string(),
                value: s.to_string(),
                expected: Self::ALL.map(|m| m.to_string()).join(", "),
            })
    }
}
