//! Uniform lifecycle hooks
//!
//! One callback runs after every completed transition, another on every
//! failed event. The defaults log through `tracing`.

use super::state::{Event, ModuleState};
use crate::error::Error;
use std::sync::Arc;
use tracing::{debug, error};

/// Called with (module name, event, from, to) after a transition completes
pub type TransitionHook = Arc<dyn Fn(&str, Event, ModuleState, ModuleState) + Send + Sync>;

/// Called with (module name, event, error) when an event fails
pub type ErrorHook = Arc<dyn Fn(&str, Event, &Error) + Send + Sync>;

/// Callback slots shared by every transition of a module
#[derive(Clone)]
pub struct Hooks {
    /// Runs after every completed transition
    pub on_transition: TransitionHook,
    /// Runs when any event fails
    pub on_error: ErrorHook,
}

impl Hooks {
    /// Replace the transition hook
    #[must_use]
    pub fn with_transition_hook(mut self, hook: TransitionHook) -> Self {
        self.on_transition = hook;
        self
    }

    /// Replace the error hook
    #[must_use]
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = hook;
        self
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            on_transition: Arc::new(|module, event, from, to| {
                debug!(module, %event, %from, %to, "changing {module} from {from} to {to}");
            }),
            on_error: Arc::new(|module, event, err| {
                error!(module, %event, "{module}: {err}");
            }),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}
