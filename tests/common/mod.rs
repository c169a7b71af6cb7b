//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;
mod mock_repository;

pub use mock_platform::{CreatePrCall, MergePrCall, MockPlatformService, make_pr};
pub use mock_repository::{MockRepository, RepoCall};

use modsync::module::{Event, Hooks, Module, ModuleMachine, ModuleState, WorkflowSettings};
use modsync::types::MergeMethod;
use std::sync::{Arc, Mutex};

/// Workflow settings matching the configuration defaults
pub fn test_settings() -> WorkflowSettings {
    WorkflowSettings {
        push_remote_name: "origin".to_string(),
        target_branch: "main".to_string(),
        pr_label: Some("maintenance".to_string()),
        merge_method: MergeMethod::Merge,
    }
}

/// Module `acme/<name>` with its working copy under `modules_sync/`
pub fn test_module(name: &str) -> Module {
    Module::new("acme", name, format!("modules_sync/{name}"))
}

/// Hooks that record every transition and error
#[derive(Clone, Default)]
pub struct HookLog {
    pub transitions: Arc<Mutex<Vec<(String, ModuleState, ModuleState)>>>,
    pub errors: Arc<Mutex<Vec<(String, Event, String)>>>,
}

impl HookLog {
    pub fn hooks(&self) -> Hooks {
        let transitions = Arc::clone(&self.transitions);
        let errors = Arc::clone(&self.errors);
        Hooks::default()
            .with_transition_hook(Arc::new(move |module, _event, from, to| {
                transitions
                    .lock()
                    .unwrap()
                    .push((module.to_string(), from, to));
            }))
            .with_error_hook(Arc::new(move |module, event, err| {
                errors
                    .lock()
                    .unwrap()
                    .push((module.to_string(), event, err.to_string()));
            }))
    }

    pub fn transitions(&self) -> Vec<(String, ModuleState, ModuleState)> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(String, Event, String)> {
        self.errors.lock().unwrap().clone()
    }
}

/// Machine wired to fresh mocks and a hook log
pub struct Harness {
    pub repo: Arc<MockRepository>,
    pub platform: Arc<MockPlatformService>,
    pub log: HookLog,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(MockRepository::new()),
            platform: Arc::new(MockPlatformService::new()),
            log: HookLog::default(),
        }
    }

    pub fn machine(&self, module: Module) -> ModuleMachine {
        ModuleMachine::new(
            module,
            self.repo.clone(),
            self.platform.clone(),
            test_settings(),
        )
        .with_hooks(self.log.hooks())
    }
}
