//! Settings file discovery and parsing

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name searched for in the working directory and home directory.
pub const SETTINGS_FILE_NAME: &str = "modsync.toml";

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "MODSYNC_CONFIG_PATH";

/// Values a settings file may override. Absent keys keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsOverlay {
    /// Hosting platform identifier
    pub platform: Option<String>,
    /// Web base URI used for clone URLs
    pub base_uri: Option<String>,
    /// REST API endpoint
    pub api_endpoint: Option<String>,
    /// Default namespace for modules
    pub namespace: Option<String>,
    /// Directory modules are cloned into
    pub sync_directory: Option<String>,
    /// Remote the working branch is pushed to
    pub push_remote_name: Option<String>,
    /// Branch review requests target
    pub target_branch: Option<String>,
    /// File listing the managed modules
    pub module_list_file: Option<String>,
    /// Label attached to review requests
    pub pr_label: Option<String>,
    /// How review requests are merged (`merge`, `squash`, `rebase`)
    pub merge_method: Option<String>,
}

/// Find the settings file to load.
///
/// Candidates in order: the explicit override, `modsync.toml` in `cwd`,
/// `modsync.toml` in `home`. The first that exists wins.
pub fn locate_settings_file(
    override_path: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let candidates = [
        override_path.map(|p| cwd.join(p)),
        Some(cwd.join(SETTINGS_FILE_NAME)),
        home.map(|h| h.join(SETTINGS_FILE_NAME)),
    ];

    candidates.into_iter().flatten().find(|p| p.is_file())
}

/// Load and parse a settings file.
pub fn load_settings(path: &Path) -> Result<SettingsOverlay> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let overlay = toml::Value::Table(normalize_keys(table))
        .try_into()
        .map_err(|e: toml::de::Error| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(path = %path.display(), "loaded settings file");
    Ok(overlay)
}

/// Normalize the keys of a settings table.
///
/// `Platform`, `:platform` and `platform` all map to `platform`; dashes
/// become underscores. On collision the later key wins.
pub fn normalize_keys(table: toml::Table) -> toml::Table {
    table
        .into_iter()
        .map(|(key, value)| (normalize_key(&key), value))
        .collect()
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches(':')
        .to_ascii_lowercase()
        .replace('-', "_")
}
