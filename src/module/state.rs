//! Module lifecycle states, events and the transition table

/// Lifecycle state of a module
///
/// Each state names the last phase that completed for the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleState {
    /// No local working copy has been ensured yet
    #[default]
    Absent,
    /// Working copy exists locally
    Present,
    /// Working copy holds the latest upstream history
    Latest,
    /// Working branch checked out (created if needed)
    CheckingOut,
    /// All changed files staged on the working branch
    FilesStaged,
    /// Staged changes committed
    Committed,
    /// Working branch pushed to the configured remote
    PushingBranch,
    /// Review request open against the target branch
    CreatingPr,
    /// Review request merged; the workflow is complete
    MergingPr,
}

impl ModuleState {
    /// Snake-case name used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Latest => "latest",
            Self::CheckingOut => "checking_out",
            Self::FilesStaged => "files_staged",
            Self::Committed => "committed",
            Self::PushingBranch => "pushing_branch",
            Self::CreatingPr => "creating_pr",
            Self::MergingPr => "merging_pr",
        }
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that drive a module between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Clone the module unless it is already present
    EnsurePresent,
    /// Fetch the latest upstream history
    EnsureLatest,
    /// Switch to the working branch
    CheckoutBranch,
    /// Stage all changed files
    StageFiles,
    /// Stage and commit; completes only if a commit was produced
    CommitCode,
    /// Push the working branch
    PushBranch,
    /// Open a review request
    CreatePr,
    /// Merge the review request
    MergePr,
}

impl Event {
    /// Snake-case name used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnsurePresent => "ensure_present",
            Self::EnsureLatest => "ensure_latest",
            Self::CheckoutBranch => "checkout_branch",
            Self::StageFiles => "stage_files",
            Self::CommitCode => "commit_code",
            Self::PushBranch => "push_branch",
            Self::CreatePr => "create_pr",
            Self::MergePr => "merge_pr",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the transition table
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    /// Event this row handles
    pub event: Event,
    /// States the event may fire from
    pub from: &'static [ModuleState],
    /// State reached when the event completes
    pub to: ModuleState,
    /// Whether the side effect's outcome decides if the state changes
    pub guarded: bool,
}

use ModuleState::{
    Absent, CheckingOut, Committed, CreatingPr, FilesStaged, Latest, MergingPr, Present,
    PushingBranch,
};

/// Every permitted transition
pub const TRANSITIONS: &[Transition] = &[
    Transition {
        event: Event::EnsurePresent,
        from: &[Absent],
        to: Present,
        guarded: false,
    },
    Transition {
        event: Event::EnsureLatest,
        from: &[Absent, Present, Latest],
        to: Latest,
        guarded: false,
    },
    Transition {
        event: Event::CheckoutBranch,
        from: &[Present, Latest],
        to: CheckingOut,
        guarded: false,
    },
    Transition {
        event: Event::StageFiles,
        from: &[CheckingOut],
        to: FilesStaged,
        guarded: false,
    },
    Transition {
        event: Event::CommitCode,
        from: &[Present, Latest, CheckingOut, FilesStaged],
        to: Committed,
        guarded: true,
    },
    Transition {
        event: Event::PushBranch,
        from: &[Committed],
        to: PushingBranch,
        guarded: false,
    },
    Transition {
        event: Event::CreatePr,
        from: &[PushingBranch],
        to: CreatingPr,
        guarded: false,
    },
    Transition {
        event: Event::MergePr,
        from: &[CreatingPr],
        to: MergingPr,
        guarded: false,
    },
];

/// Look up the transition for `event` fired from `from`
pub fn find_transition(event: Event, from: ModuleState) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.event == event && t.from.contains(&from))
}
