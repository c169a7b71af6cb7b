//! Conversion step run between fetching and committing

use crate::error::{Error, Result};
use crate::module::Module;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Rewrites a module's working copy
#[async_trait]
pub trait Converter: Send + Sync {
    /// Run the conversion inside `module`'s working copy
    async fn convert(&self, module: &Module) -> Result<()>;
}

/// Runs a shell command in the module's working copy
#[derive(Debug, Clone)]
pub struct ShellConverter {
    command: String,
}

impl ShellConverter {
    /// Create a converter running `command` through `sh -c`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Converter for ShellConverter {
    async fn convert(&self, module: &Module) -> Result<()> {
        debug!(module = %module.name, command = %self.command, "running conversion");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&module.local_path)
            .env("MODSYNC_MODULE", &module.name)
            .env("MODSYNC_NAMESPACE", &module.namespace)
            .output()
            .await
            .map_err(|e| Error::Conversion(format!("failed to run '{}': {e}", self.command)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Conversion(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
