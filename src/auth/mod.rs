//! Authentication for GitHub and GitLab
//!
//! Tokens are read from the environment variable named after the platform
//! (`GITHUB_TOKEN`, `GITLAB_TOKEN`).

use crate::error::{Error, Result};
use crate::types::Platform;
use tracing::debug;

/// Look up the access token for `platform`
///
/// `lookup` resolves environment variables; an unset or blank variable is
/// reported as [`Error::MissingToken`].
pub fn lookup_token(platform: Platform, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let variable = platform.token_variable();
    match lookup(&variable) {
        Some(token) if !token.trim().is_empty() => {
            debug!(%platform, %variable, "found access token");
            Ok(token)
        }
        _ => Err(Error::MissingToken { platform, variable }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_read_from_platform_variable() {
        let token = lookup_token(Platform::GitLab, |key| {
            (key == "GITLAB_TOKEN").then(|| "glpat-123".to_string())
        })
        .unwrap();
        assert_eq!(token, "glpat-123");
    }

    #[test]
    fn test_blank_token_is_missing() {
        let err = lookup_token(Platform::GitHub, |_| Some("   ".to_string())).unwrap_err();
        match err {
            Error::MissingToken { variable, .. } => assert_eq!(variable, "GITHUB_TOKEN"),
            other => panic!("Expected MissingToken, got: {other:?}"),
        }
    }

    #[test]
    fn test_other_platform_token_not_used() {
        let result = lookup_token(Platform::GitHub, |key| {
            (key == "GITLAB_TOKEN").then(|| "glpat-123".to_string())
        });
        assert!(matches!(result, Err(Error::MissingToken { .. })));
    }
}
