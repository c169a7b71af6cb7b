//! Run command - synchronize every managed module

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use modsync::error::Result;
use modsync::fleet::{
    FleetOptions, FleetReport, FleetRunner, ModuleOutcome, ShellConverter, load_module_list,
    modules_from_entries,
};
use modsync::module::WorkflowSettings;
use modsync::types::MergeMethod;
use std::path::Path;
use std::sync::Arc;

/// Options for the run command
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Commit message for the synchronized changes
    pub message: String,
    /// Working branch name
    pub branch: String,
    /// Modules to process instead of the module list file
    pub modules: Vec<String>,
    /// Conversion command run in each working copy
    pub convert: Option<String>,
    /// Stop after committing
    pub no_pr: bool,
    /// Merge review requests after opening them
    pub merge: bool,
    /// Merge method overriding the configured one
    pub merge_method: Option<MergeMethod>,
    /// Modules processed concurrently
    pub jobs: usize,
}

/// Run the sync workflow over the fleet
///
/// Returns whether every module succeeded.
pub async fn run_fleet(config_path: Option<&Path>, options: RunOptions) -> Result<bool> {
    let ctx = CommandContext::new(config_path)?;
    let config = &ctx.config;

    let modules = if options.modules.is_empty() {
        load_module_list(
            &config.module_list_file,
            &config.namespace,
            &config.sync_directory,
        )?
    } else {
        modules_from_entries(&options.modules, &config.namespace, &config.sync_directory)?
    };

    if modules.is_empty() {
        println!("{}", "No modules to sync".muted());
        return Ok(true);
    }

    println!(
        "{} {} module(s) on {}",
        "Syncing".emphasis(),
        modules.len().accent(),
        config.platform.accent()
    );

    let fleet_options = FleetOptions {
        commit_message: options.message,
        branch: options.branch,
        open_pr: !options.no_pr,
        merge: options.merge,
        jobs: options.jobs,
    };

    let mut settings = WorkflowSettings::from(config);
    if let Some(method) = options.merge_method {
        settings.merge_method = method;
    }

    let mut runner = FleetRunner::new(
        Arc::clone(&ctx.repo_ops),
        Arc::clone(&ctx.platform),
        settings,
        fleet_options,
    );
    if let Some(command) = options.convert {
        runner = runner.with_converter(Arc::new(ShellConverter::new(command)));
    }

    let report = runner.run(modules).await;
    print_report(&report);
    Ok(report.is_success())
}

fn print_report(report: &FleetReport) {
    println!();
    for module in &report.modules {
        match &module.outcome {
            ModuleOutcome::Completed => {
                println!("  {} {} ({})", check(), module.name, module.final_state.muted());
            }
            ModuleOutcome::NothingToCommit => {
                println!("  {} {} {}", check(), module.name, "nothing to commit".muted());
            }
            ModuleOutcome::Failed(message) => {
                println!(
                    "  {} {} ({}): {}",
                    cross(),
                    module.name,
                    module.final_state.muted(),
                    message.failure()
                );
            }
        }
    }

    println!();
    println!(
        "{} completed, {} unchanged, {} failed",
        report.count(&ModuleOutcome::Completed).accent(),
        report.count(&ModuleOutcome::NothingToCommit).accent(),
        report.count(&ModuleOutcome::Failed(String::new())).accent()
    );
}
