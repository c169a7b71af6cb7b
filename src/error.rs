//! Error types for modsync
//!
//! Errors fall into three classes: configuration errors stop the process
//! before any module is touched, while VCS and platform errors are fatal only
//! for the module that raised them.

use crate::types::Platform;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by configuration, repository and platform operations
#[derive(Debug, Error)]
pub enum Error {
    /// The configured platform is not one of the supported set
    #[error("unsupported hosting platform '{value}'; supported platforms are: {supported}")]
    UnsupportedPlatform {
        /// The offending value as written in the settings file
        value: String,
        /// Comma-separated list of supported platforms
        supported: String,
    },

    /// The access token for the configured platform is unset or empty
    #[error("{platform} access token not set - use 'export {variable}=\"<your token>\"' to set it")]
    MissingToken {
        /// Platform the token was looked up for
        platform: Platform,
        /// Name of the environment variable that was consulted
        variable: String,
    },

    /// The settings file could not be read or parsed
    #[error("failed to load settings from {}: {message}", path.display())]
    ConfigParse {
        /// Path of the settings file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// An endpoint setting is not a valid URL
    #[error("setting '{key}' is not a valid URL: {value}")]
    InvalidUrl {
        /// Settings key holding the URL
        key: String,
        /// The rejected value
        value: String,
    },

    /// A setting holds a value outside its allowed set
    #[error("setting '{key}' has unsupported value '{value}'; expected one of: {expected}")]
    InvalidSetting {
        /// Settings key
        key: String,
        /// The rejected value
        value: String,
        /// Comma-separated allowed values
        expected: String,
    },

    /// A clone/fetch/checkout/stage/commit/push failed
    #[error("git {operation} failed: {message}")]
    Vcs {
        /// The git operation that failed
        operation: &'static str,
        /// Error output from git
        message: String,
    },

    /// A hosting platform API call failed
    #[error("{platform} API error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    PlatformApi {
        /// Platform that returned the error
        platform: Platform,
        /// HTTP status code, when the failure came from a response
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Invalid argument passed to a module operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Event fired from a state that does not permit it
    #[error("event '{event}' cannot fire from state '{state}'")]
    InvalidTransition {
        /// Event name
        event: String,
        /// State the module was in
        state: String,
    },

    /// Module list could not be loaded
    #[error("module list error: {0}")]
    ModuleList(String),

    /// Conversion command failed
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a GitHub API error without an HTTP status
    pub fn github(message: impl Into<String>) -> Self {
        Self::PlatformApi {
            platform: Platform::GitHub,
            status: None,
            message: message.into(),
        }
    }

    /// Shorthand for a GitLab API error without an HTTP status
    pub fn gitlab(message: impl Into<String>) -> Self {
        Self::PlatformApi {
            platform: Platform::GitLab,
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error belongs to the configuration class
    ///
    /// Configuration errors are fatal for the whole process.
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform { .. }
                | Self::MissingToken { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidUrl { .. }
                | Self::InvalidSetting { .. }
        )
    }
}

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        match e {
            octocrab::Error::GitHub { source, .. } => Self::PlatformApi {
                platform: Platform::GitHub,
                status: Some(source.status_code.as_u16()),
                message: source.message,
            },
            other => Self::github(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::PlatformApi {
            platform: Platform::GitLab,
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
