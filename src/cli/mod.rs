//! CLI commands

pub mod config;
pub mod context;
pub mod run;
pub mod style;

pub use config::run_config;
pub use run::{RunOptions, run_fleet};
