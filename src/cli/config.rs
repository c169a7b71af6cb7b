//! Config command - show the resolved configuration

use crate::cli::style::Stylize;
use anstream::println;
use modsync::config::Configuration;
use modsync::error::Result;
use std::path::Path;

/// Print the resolved configuration with the token redacted
pub fn run_config(config_path: Option<&Path>) -> Result<()> {
    let config = Configuration::resolve(config_path)?;

    let source = config
        .settings_path
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string());

    println!("{} {}", "Settings:".emphasis(), source.muted());
    let rows = [
        ("platform", config.platform.as_str().to_string()),
        ("access_token", format!("<set via {}>", config.platform.token_variable())),
        ("base_uri", config.base_uri.clone()),
        ("api_endpoint", config.api_endpoint.clone()),
        ("namespace", config.namespace.clone()),
        ("sync_directory", config.sync_directory.display().to_string()),
        ("push_remote_name", config.push_remote_name.clone()),
        ("target_branch", config.target_branch.clone()),
        ("module_list_file", config.module_list_file.display().to_string()),
        ("pr_label", config.pr_label.clone().unwrap_or_else(|| "(none)".to_string())),
        ("merge_method", config.merge_method.to_string()),
    ];

    for (key, value) in rows {
        println!("  {} {value}", format!("{key:<18}").accent());
    }

    Ok(())
}
