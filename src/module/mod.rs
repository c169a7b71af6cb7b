//! Per-module synchronization state machine
//!
//! A [`ModuleMachine`] drives one [`Module`] through a fixed sequence of
//! guarded transitions: ensure present, ensure latest, commit, push, open and
//! merge a review request. Each event checks the transition table, runs its
//! side effect and only then moves the module to the next state. Failures are
//! reported through the error hook and leave the module in the last state it
//! completed; nothing is rolled back.

mod hooks;
mod state;

pub use hooks::{ErrorHook, Hooks, TransitionHook};
pub use state::{Event, ModuleState, TRANSITIONS, Transition, find_transition};

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::RepositoryOps;
use crate::types::{MergeMethod, PullRequest, RepoRef, ReviewRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One synchronized repository
#[derive(Debug, Clone)]
pub struct Module {
    /// Owning namespace on the hosting platform
    pub namespace: String,
    /// Repository name
    pub name: String,
    /// Location of the working copy
    pub local_path: PathBuf,
    state: ModuleState,
    pending_commit_message: Option<String>,
    pending_branch_name: Option<String>,
    working_branch: Option<String>,
    commit_message: Option<String>,
    review_request: Option<PullRequest>,
}

impl Module {
    /// Create a module in the initial `absent` state
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        local_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            local_path: local_path.into(),
            state: ModuleState::Absent,
            pending_commit_message: None,
            pending_branch_name: None,
            working_branch: None,
            commit_message: None,
            review_request: None,
        }
    }

    /// Current lifecycle state
    pub const fn state(&self) -> ModuleState {
        self.state
    }

    /// Repository reference on the hosting platform
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.namespace, &self.name)
    }

    /// Commit message waiting to be consumed by `commit_code`
    pub fn pending_commit_message(&self) -> Option<&str> {
        self.pending_commit_message.as_deref()
    }

    /// Branch name waiting to be consumed by checkout/commit
    pub fn pending_branch_name(&self) -> Option<&str> {
        self.pending_branch_name.as_deref()
    }

    /// Branch the last commit landed on
    pub fn working_branch(&self) -> Option<&str> {
        self.working_branch.as_deref()
    }

    /// Review request opened for this module, if any
    pub const fn review_request(&self) -> Option<&PullRequest> {
        self.review_request.as_ref()
    }
}

/// Outcome of a `commit_code` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created and the module is now `committed`
    Committed,
    /// Nothing to commit; the module stayed in its prior state
    NothingToCommit,
}

/// Workflow settings a machine needs from the configuration
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    /// Remote the working branch is pushed to
    pub push_remote_name: String,
    /// Branch review requests target
    pub target_branch: String,
    /// Label attached to review requests
    pub pr_label: Option<String>,
    /// How review requests are merged
    pub merge_method: MergeMethod,
}

impl From<&Configuration> for WorkflowSettings {
    fn from(config: &Configuration) -> Self {
        Self {
            push_remote_name: config.push_remote_name.clone(),
            target_branch: config.target_branch.clone(),
            pr_label: config.pr_label.clone(),
            merge_method: config.merge_method,
        }
    }
}

/// Drives a single module through its lifecycle
pub struct ModuleMachine {
    module: Module,
    repo_ops: Arc<dyn RepositoryOps>,
    platform: Arc<dyn PlatformService>,
    settings: WorkflowSettings,
    hooks: Hooks,
}

impl ModuleMachine {
    /// Create a machine with the default logging hooks
    pub fn new(
        module: Module,
        repo_ops: Arc<dyn RepositoryOps>,
        platform: Arc<dyn PlatformService>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            module,
            repo_ops,
            platform,
            settings,
            hooks: Hooks::default(),
        }
    }

    /// Replace the lifecycle hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// The module being driven
    pub const fn module(&self) -> &Module {
        &self.module
    }

    /// Current lifecycle state
    pub const fn state(&self) -> ModuleState {
        self.module.state
    }

    /// Consume the machine, returning the module
    pub fn into_module(self) -> Module {
        self.module
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// `absent → present`: clone the module unless a working copy exists
    pub async fn ensure_present(&mut self) -> Result<()> {
        let result = self.run_ensure_present().await;
        self.report(Event::EnsurePresent, result)
    }

    /// `{absent, present, latest} → latest`: fetch upstream history,
    /// ensuring presence first when absent
    pub async fn ensure_latest(&mut self) -> Result<()> {
        let result = self.run_ensure_latest().await;
        self.report(Event::EnsureLatest, result)
    }

    /// `{present, latest} → checking_out`: switch to `branch`
    pub async fn checkout_branch(&mut self, branch: &str) -> Result<()> {
        let result = self.run_checkout_branch(branch).await;
        self.report(Event::CheckoutBranch, result)
    }

    /// `checking_out → files_staged`: stage everything on `branch`,
    /// checking it out first when needed
    pub async fn stage_files(&mut self, branch: &str) -> Result<()> {
        let result = self.run_stage_files(branch).await;
        self.report(Event::StageFiles, result)
    }

    /// Stage and commit all changes on `branch`
    ///
    /// Both arguments are required; a missing one fails before any side
    /// effect. The module only becomes `committed` if the commit produced a
    /// change, otherwise it keeps its prior state.
    pub async fn commit_code(
        &mut self,
        message: Option<&str>,
        branch: Option<&str>,
    ) -> Result<CommitOutcome> {
        let result = self.run_commit_code(message, branch).await;
        self.report(Event::CommitCode, result)
    }

    /// `committed → pushing_branch`: push the working branch
    pub async fn push_branch(&mut self) -> Result<()> {
        let result = self.run_push_branch().await;
        self.report(Event::PushBranch, result)
    }

    /// `pushing_branch → creating_pr`: open (or reuse) a review request
    pub async fn create_pr(&mut self) -> Result<PullRequest> {
        let result = self.run_create_pr().await;
        self.report(Event::CreatePr, result)
    }

    /// `creating_pr → merging_pr`: merge the review request
    pub async fn merge_pr(&mut self) -> Result<()> {
        let result = self.run_merge_pr().await;
        self.report(Event::MergePr, result)
    }

    // =========================================================================
    // Event bodies
    // =========================================================================

    async fn run_ensure_present(&mut self) -> Result<()> {
        let transition = self.permit(Event::EnsurePresent)?;

        if self.repo_ops.is_present(&self.module.local_path) {
            debug!(module = %self.module.name, "already present, skipping clone");
        } else {
            self.repo_ops
                .clone_repo(&self.module.repo_ref(), &self.module.local_path)
                .await?;
        }

        self.apply(transition);
        Ok(())
    }

    async fn run_ensure_latest(&mut self) -> Result<()> {
        if self.module.state == ModuleState::Absent {
            self.run_ensure_present().await?;
        }

        let transition = self.permit(Event::EnsureLatest)?;
        self.repo_ops
            .fetch_updates(
                &self.module.local_path,
                &self.settings.push_remote_name,
                &self.settings.target_branch,
            )
            .await?;
        self.apply(transition);
        Ok(())
    }

    async fn run_checkout_branch(&mut self, branch: &str) -> Result<()> {
        let transition = self.permit(Event::CheckoutBranch)?;
        self.module.pending_branch_name = Some(branch.to_string());
        let checked_out = self.checkout().await;
        self.module.pending_branch_name = None;
        checked_out?;
        self.apply(transition);
        Ok(())
    }

    async fn run_stage_files(&mut self, branch: &str) -> Result<()> {
        if matches!(self.module.state, ModuleState::Present | ModuleState::Latest) {
            self.run_checkout_branch(branch).await?;
        }

        let transition = self.permit(Event::StageFiles)?;
        self.repo_ops.stage_files(&self.module.local_path).await?;
        self.apply(transition);
        Ok(())
    }

    async fn run_commit_code(
        &mut self,
        message: Option<&str>,
        branch: Option<&str>,
    ) -> Result<CommitOutcome> {
        let (Some(message), Some(branch)) = (message, branch) else {
            return Err(Error::InvalidArgument(
                "commit_code needs a commit message and a branch name".to_string(),
            ));
        };

        let transition = self.permit(Event::CommitCode)?;
        self.module.pending_commit_message = Some(message.to_string());
        self.module.pending_branch_name = Some(branch.to_string());

        let committed = self.commit_staged().await;

        // Pending values are consumed whether or not the commit happened
        self.module.pending_commit_message = None;
        self.module.pending_branch_name = None;
        let committed = committed?;

        if transition.guarded && !committed {
            debug!(
                module = %self.module.name,
                state = %self.module.state,
                "nothing to commit, state unchanged"
            );
            return Ok(CommitOutcome::NothingToCommit);
        }

        self.module.working_branch = Some(branch.to_string());
        self.module.commit_message = Some(message.to_string());
        self.apply(transition);
        Ok(CommitOutcome::Committed)
    }

    /// Checkout, stage and commit using the pending message and branch
    async fn commit_staged(&self) -> Result<bool> {
        let ops = self.repo_ops.as_ref();
        let path = &self.module.local_path;
        let (Some(message), Some(branch)) = (
            self.module.pending_commit_message.as_deref(),
            self.module.pending_branch_name.as_deref(),
        ) else {
            return Err(Error::Internal("commit without pending values".to_string()));
        };

        self.checkout().await?;
        ops.stage_files(path).await?;
        ops.commit_staged_files(path, branch, message).await
    }

    async fn run_push_branch(&mut self) -> Result<()> {
        let transition = self.permit(Event::PushBranch)?;
        let branch = self.working_branch()?;

        self.repo_ops
            .push_branch(
                &self.module.local_path,
                &self.settings.push_remote_name,
                &branch,
            )
            .await?;

        self.apply(transition);
        Ok(())
    }

    async fn run_create_pr(&mut self) -> Result<PullRequest> {
        let transition = self.permit(Event::CreatePr)?;
        let branch = self.working_branch()?;
        let repo = self.module.repo_ref();

        let pr = if let Some(existing) = self.platform.find_existing_pr(&repo, &branch).await? {
            debug!(module = %self.module.name, pr_number = existing.number, "reusing open review request");
            existing
        } else {
            let (title, body) = self
                .module
                .commit_message
                .as_deref()
                .map_or((branch.as_str(), None), split_commit_message);
            let request = ReviewRequest {
                title: title.to_string(),
                body: body.map(str::to_string),
                head: branch.clone(),
                base: self.settings.target_branch.clone(),
                label: self.settings.pr_label.clone(),
            };
            self.platform.create_pr(&repo, &request).await?
        };

        self.module.review_request = Some(pr.clone());
        self.apply(transition);
        Ok(pr)
    }

    async fn run_merge_pr(&mut self) -> Result<()> {
        let transition = self.permit(Event::MergePr)?;
        let pr_number = self
            .module
            .review_request
            .as_ref()
            .map(|pr| pr.number)
            .ok_or_else(|| Error::Internal("no review request to merge".to_string()))?;

        let result = self
            .platform
            .merge_pr(&self.module.repo_ref(), pr_number, self.settings.merge_method)
            .await?;

        if !result.merged {
            return Err(Error::PlatformApi {
                platform: self.platform.platform(),
                status: None,
                message: result
                    .message
                    .unwrap_or_else(|| format!("review request #{pr_number} was not merged")),
            });
        }

        self.apply(transition);
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn permit(&self, event: Event) -> Result<&'static Transition> {
        find_transition(event, self.module.state).ok_or_else(|| Error::InvalidTransition {
            event: event.to_string(),
            state: self.module.state.to_string(),
        })
    }

    fn apply(&mut self, transition: &Transition) {
        let from = self.module.state;
        self.module.state = transition.to;
        (self.hooks.on_transition)(&self.module.name, transition.event, from, transition.to);
    }

    fn report<T>(&self, event: Event, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            (self.hooks.on_error)(&self.module.name, event, e);
        }
        result
    }

    /// Check out the pending branch, started from the latest target branch
    async fn checkout(&self) -> Result<()> {
        let branch = self
            .module
            .pending_branch_name
            .as_deref()
            .ok_or_else(|| Error::InvalidArgument("no branch name to check out".to_string()))?;
        let start_point = format!(
            "{}/{}",
            self.settings.push_remote_name, self.settings.target_branch
        );
        self.repo_ops
            .checkout_branch(&self.module.local_path, branch, &start_point)
            .await
    }

    fn working_branch(&self) -> Result<String> {
        self.module
            .working_branch
            .clone()
            .ok_or_else(|| Error::Internal("no committed branch".to_string()))
    }
}

/// Split a commit message into its subject line and the remaining body
fn split_commit_message(message: &str) -> (&str, Option<&str>) {
    let (subject, body) = message.split_once('\n').unwrap_or((message, ""));
    let body = body.trim();
    (subject.trim(), (!body.is_empty()).then_some(body))
}
