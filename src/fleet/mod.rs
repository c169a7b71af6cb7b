//! Fleet runner
//!
//! Drives every managed module through its workflow with a bounded worker
//! pool. Modules never share state: each gets its own [`ModuleMachine`], and
//! a failure in one leaves its siblings running.

mod convert;
mod modules;

pub use convert::{Converter, ShellConverter};
pub use modules::{load_module_list, modules_from_entries};

use crate::error::Result;
use crate::module::{CommitOutcome, Hooks, Module, ModuleMachine, ModuleState, WorkflowSettings};
use crate::platform::PlatformService;
use crate::repo::RepositoryOps;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Default number of modules processed concurrently
pub const DEFAULT_JOBS: usize = 4;

/// What to do with each module
#[derive(Debug, Clone)]
pub struct FleetOptions {
    /// Commit message for the synchronized changes
    pub commit_message: String,
    /// Working branch the changes are committed on
    pub branch: String,
    /// Push the branch and open a review request after committing
    pub open_pr: bool,
    /// Merge the review request once opened
    pub merge: bool,
    /// Maximum number of modules processed at once
    pub jobs: usize,
}

/// How a module's run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// Every requested phase completed
    Completed,
    /// Nothing changed, so nothing was committed
    NothingToCommit,
    /// A phase failed; later phases were skipped
    Failed(String),
}

/// Result of one module's run
#[derive(Debug, Clone)]
pub struct ModuleReport {
    /// `namespace/name` of the module
    pub name: String,
    /// State the module ended in
    pub final_state: ModuleState,
    /// How the run ended
    pub outcome: ModuleOutcome,
}

/// Results for the whole fleet, in module list order
#[derive(Debug, Clone, Default)]
pub struct FleetReport {
    /// Per-module reports
    pub modules: Vec<ModuleReport>,
}

impl FleetReport {
    /// Reports of modules that failed
    pub fn failed(&self) -> impl Iterator<Item = &ModuleReport> {
        self.modules
            .iter()
            .filter(|m| matches!(m.outcome, ModuleOutcome::Failed(_)))
    }

    /// Number of modules with the given outcome kind
    pub fn count(&self, outcome: &ModuleOutcome) -> usize {
        self.modules
            .iter()
            .filter(|m| std::mem::discriminant(&m.outcome) == std::mem::discriminant(outcome))
            .count()
    }

    /// Whether no module failed
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Runs modules through the workflow
pub struct FleetRunner {
    repo_ops: Arc<dyn RepositoryOps>,
    platform: Arc<dyn PlatformService>,
    settings: WorkflowSettings,
    options: Arc<FleetOptions>,
    converter: Option<Arc<dyn Converter>>,
    hooks: Hooks,
}

impl FleetRunner {
    /// Create a runner sharing one repository driver and platform client
    pub fn new(
        repo_ops: Arc<dyn RepositoryOps>,
        platform: Arc<dyn PlatformService>,
        settings: WorkflowSettings,
        options: FleetOptions,
    ) -> Self {
        Self {
            repo_ops,
            platform,
            settings,
            options: Arc::new(options),
            converter: None,
            hooks: Hooks::default(),
        }
    }

    /// Run `converter` after fetching and before committing
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Use `hooks` for every module's machine
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Build the machine for one module
    pub fn machine(&self, module: Module) -> ModuleMachine {
        ModuleMachine::new(
            module,
            Arc::clone(&self.repo_ops),
            Arc::clone(&self.platform),
            self.settings.clone(),
        )
        .with_hooks(self.hooks.clone())
    }

    /// Process every module, at most `jobs` at a time
    pub async fn run(&self, modules: Vec<Module>) -> FleetReport {
        let semaphore = Arc::new(Semaphore::new(self.options.jobs.max(1)));
        let names: Vec<String> = modules.iter().map(|m| m.repo_ref().full_path()).collect();
        let mut tasks = JoinSet::new();

        for (index, module) in modules.into_iter().enumerate() {
            let machine = self.machine(module);
            let converter = self.converter.clone();
            let options = Arc::clone(&self.options);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let report = run_module(machine, converter.as_deref(), &options).await;
                (index, report)
            });
        }

        let mut slots: Vec<Option<ModuleReport>> = vec![None; names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => error!("module task aborted: {e}"),
            }
        }

        let modules = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| ModuleReport {
                    name,
                    final_state: ModuleState::Absent,
                    outcome: ModuleOutcome::Failed("task aborted".to_string()),
                })
            })
            .collect();

        FleetReport { modules }
    }
}

/// Drive one module through the workflow and report how it ended
pub async fn run_module(
    mut machine: ModuleMachine,
    converter: Option<&dyn Converter>,
    options: &FleetOptions,
) -> ModuleReport {
    let outcome = match drive(&mut machine, converter, options).await {
        Ok(outcome) => outcome,
        Err(e) => ModuleOutcome::Failed(e.to_string()),
    };

    let module = machine.into_module();
    let report = ModuleReport {
        name: module.repo_ref().full_path(),
        final_state: module.state(),
        outcome,
    };
    info!(module = %report.name, state = %report.final_state, outcome = ?report.outcome, "module finished");
    report
}

async fn drive(
    machine: &mut ModuleMachine,
    converter: Option<&dyn Converter>,
    options: &FleetOptions,
) -> Result<ModuleOutcome> {
    machine.ensure_latest().await?;

    if let Some(converter) = converter
        && let Err(e) = converter.convert(machine.module()).await
    {
        error!(module = %machine.module().name, "{e}");
        return Err(e);
    }

    let committed = machine
        .commit_code(Some(&options.commit_message), Some(&options.branch))
        .await?;
    if committed == CommitOutcome::NothingToCommit {
        return Ok(ModuleOutcome::NothingToCommit);
    }

    if options.open_pr {
        machine.push_branch().await?;
        machine.create_pr().await?;
        if options.merge {
            machine.merge_pr().await?;
        }
    }

    Ok(ModuleOutcome::Completed)
}
