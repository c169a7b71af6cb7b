//! modsync - keep a fleet of module repositories in sync
//!
//! Each managed module is driven through a fixed workflow: obtain a working
//! copy, pull the latest history, run a conversion, commit the result, push a
//! branch and open (optionally merge) a review request on GitHub or GitLab.
//!
//! - [`config`] resolves settings and credentials once per process
//! - [`module`] holds the per-module state machine
//! - [`fleet`] runs the state machine over the module list
//! - [`repo`] and [`platform`] are the git and hosting platform collaborators

pub mod auth;
pub mod config;
pub mod error;
pub mod fleet;
pub mod module;
pub mod platform;
pub mod repo;
pub mod types;

pub use config::Configuration;
pub use error::{Error, Result};
