//! Module list loading

use crate::error::{Error, Result};
use crate::module::Module;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ModuleListFile {
    #[serde(default)]
    modules: Vec<String>,
}

/// Load the managed modules from a TOML file of the form
/// `modules = ["widgets", "other-org/gadgets"]`.
///
/// Entries without a namespace use `default_namespace`. Each module's working
/// copy lives at `sync_directory/<name>`.
pub fn load_module_list(
    path: &Path,
    default_namespace: &str,
    sync_directory: &Path,
) -> Result<Vec<Module>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::ModuleList(format!("failed to read {}: {e}", path.display())))?;

    let list: ModuleListFile = toml::from_str(&content)
        .map_err(|e| Error::ModuleList(format!("failed to parse {}: {e}", path.display())))?;

    modules_from_entries(&list.modules, default_namespace, sync_directory)
}

/// Build modules from `name` / `namespace/name` entries
///
/// Two entries resolving to the same local path are rejected: working copies
/// are never shared between modules.
pub fn modules_from_entries(
    entries: &[String],
    default_namespace: &str,
    sync_directory: &Path,
) -> Result<Vec<Module>> {
    let mut seen = HashSet::new();
    let mut modules = Vec::with_capacity(entries.len());

    for entry in entries {
        let entry = entry.trim();
        let (namespace, name) = match entry.rsplit_once('/') {
            Some((namespace, name)) => (namespace, name),
            None => (default_namespace, entry),
        };

        if namespace.is_empty() || name.is_empty() {
            return Err(Error::ModuleList(format!("invalid module entry '{entry}'")));
        }

        let local_path = sync_directory.join(name);
        if !seen.insert(local_path.clone()) {
            return Err(Error::ModuleList(format!(
                "module '{entry}' would share working copy {} with another module",
                local_path.display()
            )));
        }

        modules.push(Module::new(namespace, name, local_path));
    }

    Ok(modules)
}
