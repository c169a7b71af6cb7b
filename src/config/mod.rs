//! Process-wide configuration
//!
//! Resolved once at startup from built-in defaults, the first settings file
//! found (see [`locate_settings_file`]) and the platform token in the
//! environment. A [`Configuration`] always carries a supported platform and a
//! non-empty token; both are checked when it is built.

mod settings;

pub use settings::{
    CONFIG_PATH_ENV, SETTINGS_FILE_NAME, SettingsOverlay, load_settings, locate_settings_file,
    normalize_keys,
};

use crate::auth::lookup_token;
use crate::error::{Error, Result};
use crate::types::{MergeMethod, Platform};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default namespace for modules listed without one
pub const DEFAULT_NAMESPACE: &str = "puppetlabs";
/// Default directory modules are cloned into
pub const DEFAULT_SYNC_DIRECTORY: &str = "modules_sync";
/// Default remote the working branch is pushed to
pub const DEFAULT_PUSH_REMOTE: &str = "origin";
/// Default branch review requests target
pub const DEFAULT_TARGET_BRANCH: &str = "main";
/// Default module list file
pub const DEFAULT_MODULE_LIST_FILE: &str = "managed_modules.toml";
/// Default review request label
pub const DEFAULT_PR_LABEL: &str = "maintenance";

const GITHUB_BASE_URI: &str = "https://github.com";
const GITHUB_API_ENDPOINT: &str = "https://api.github.com";
const GITLAB_BASE_URI: &str = "https://gitlab.com";
const GITLAB_API_ENDPOINT: &str = "https://gitlab.com/api/v4";

/// Default web base URI for a platform
pub const fn default_base_uri(platform: Platform) -> &'static str {
    match platform {
        Platform::GitHub => GITHUB_BASE_URI,
        Platform::GitLab => GITLAB_BASE_URI,
    }
}

/// Default REST API endpoint for a platform
pub const fn default_api_endpoint(platform: Platform) -> &'static str {
    match platform {
        Platform::GitHub => GITHUB_API_ENDPOINT,
        Platform::GitLab => GITLAB_API_ENDPOINT,
    }
}

/// Credentials and endpoint needed to build a platform client
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformAccess {
    /// Access token
    pub access_token: String,
    /// REST API endpoint
    pub api_endpoint: String,
}

impl std::fmt::Debug for PlatformAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformAccess")
            .field("access_token", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Hosting platform
    pub platform: Platform,
    /// Web base URI used to build clone URLs
    pub base_uri: String,
    /// REST API endpoint
    pub api_endpoint: String,
    /// Default namespace for modules
    pub namespace: String,
    /// Directory modules are cloned into
    pub sync_directory: PathBuf,
    /// Remote the working branch is pushed to
    pub push_remote_name: String,
    /// Branch review requests target
    pub target_branch: String,
    /// File listing the managed modules
    pub module_list_file: PathBuf,
    /// Label attached to review requests (None when disabled)
    pub pr_label: Option<String>,
    /// How review requests are merged
    pub merge_method: MergeMethod,
    /// Settings file the values came from, if any
    pub settings_path: Option<PathBuf>,
    access: PlatformAccess,
}

impl Configuration {
    /// Resolve configuration from the real process environment
    pub fn resolve(override_path: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve_with(override_path, &cwd, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit working directory and
    /// environment lookup
    ///
    /// The override path falls back to `MODSYNC_CONFIG_PATH`; the home
    /// directory comes from `HOME`, then the platform's notion of home.
    pub fn resolve_with(
        override_path: Option<&Path>,
        cwd: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env_override = lookup(CONFIG_PATH_ENV).map(PathBuf::from);
        let override_path = override_path.or(env_override.as_deref());
        let home = lookup("HOME").map(PathBuf::from).or_else(dirs::home_dir);

        let settings_path = locate_settings_file(override_path, cwd, home.as_deref());
        let overlay = match &settings_path {
            Some(path) => load_settings(path)?,
            None => {
                debug!("no settings file found, using defaults");
                SettingsOverlay::default()
            }
        };

        Self::from_overlay(overlay, settings_path, lookup)
    }

    /// Merge an overlay onto the defaults and validate the result
    pub fn from_overlay(
        overlay: SettingsOverlay,
        settings_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let platform = match overlay.platform.as_deref() {
            Some(value) => value.parse()?,
            None => Platform::GitHub,
        };

        let base_uri = overlay
            .base_uri
            .unwrap_or_else(|| default_base_uri(platform).to_string());
        let api_endpoint = overlay
            .api_endpoint
            .unwrap_or_else(|| default_api_endpoint(platform).to_string());
        validate_url("base_uri", &base_uri)?;
        validate_url("api_endpoint", &api_endpoint)?;

        let merge_method = match overlay.merge_method.as_deref() {
            Some(value) => value.parse()?,
            None => MergeMethod::default(),
        };

        let access_token = lookup_token(platform, &lookup)?;

        let pr_label = match overlay.pr_label {
            Some(label) if label.trim().is_empty() => None,
            Some(label) => Some(label),
            None => Some(DEFAULT_PR_LABEL.to_string()),
        };

        let config = Self {
            platform,
            namespace: overlay
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            sync_directory: PathBuf::from(
                overlay
                    .sync_directory
                    .unwrap_or_else(|| DEFAULT_SYNC_DIRECTORY.to_string()),
            ),
            push_remote_name: overlay
                .push_remote_name
                .unwrap_or_else(|| DEFAULT_PUSH_REMOTE.to_string()),
            target_branch: overlay
                .target_branch
                .unwrap_or_else(|| DEFAULT_TARGET_BRANCH.to_string()),
            module_list_file: PathBuf::from(
                overlay
                    .module_list_file
                    .unwrap_or_else(|| DEFAULT_MODULE_LIST_FILE.to_string()),
            ),
            pr_label,
            merge_method,
            settings_path,
            access: PlatformAccess {
                access_token,
                api_endpoint: api_endpoint.clone(),
            },
            base_uri,
            api_endpoint,
        };

        debug!(platform = %config.platform, api_endpoint = %config.api_endpoint, "resolved configuration");
        Ok(config)
    }

    /// Access token for the configured platform
    pub fn access_token(&self) -> &str {
        &self.access.access_token
    }

    /// Token and endpoint for building the platform client
    pub const fn platform_access(&self) -> &PlatformAccess {
        &self.access
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    url::Url::parse(value).map_err(|_| Error::InvalidUrl {
        key: key.to_string(),
        value: value.to_string(),
    })?;
    Ok(())
}
