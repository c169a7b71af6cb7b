//! Shared command context for CLI commands
//!
//! Resolves the configuration once and builds the collaborators every
//! module shares.

use modsync::config::Configuration;
use modsync::error::Result;
use modsync::platform::{PlatformService, create_platform_service};
use modsync::repo::{GitCli, RepositoryOps};
use std::path::Path;
use std::sync::Arc;

/// Configuration plus the read-only collaborators built from it
pub struct CommandContext {
    /// Resolved configuration
    pub config: Configuration,
    /// Platform service (GitHub/GitLab)
    pub platform: Arc<dyn PlatformService>,
    /// Git driver
    pub repo_ops: Arc<dyn RepositoryOps>,
}

impl CommandContext {
    /// Resolve configuration and create the platform client and git driver
    ///
    /// Fails before any module is touched when the configuration is invalid.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Configuration::resolve(config_path)?;
        let platform = create_platform_service(config.platform, config.platform_access())?;
        let repo_ops: Arc<dyn RepositoryOps> = Arc::new(GitCli::new(&config.base_uri));

        Ok(Self {
            config,
            platform,
            repo_ops,
        })
    }
}
