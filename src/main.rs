//! modsync - keep a fleet of module repositories in sync

mod cli;

use clap::{Parser, Subcommand};
use cli::RunOptions;
use modsync::fleet::DEFAULT_JOBS;
use modsync::types::MergeMethod;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modsync")]
#[command(about = "Keep a fleet of module repositories in sync via GitHub/GitLab review requests")]
#[command(version)]
struct Cli {
    /// Settings file to use instead of the default search
    /// (falls back to `MODSYNC_CONFIG_PATH`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every state transition
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every managed module: fetch, convert, commit, push, open review requests
    Run {
        /// Commit message (also the review request title)
        #[arg(short, long)]
        message: String,

        /// Working branch to commit on
        #[arg(short, long)]
        branch: String,

        /// Process only these modules (`name` or `namespace/name`)
        #[arg(long = "module")]
        modules: Vec<String>,

        /// Shell command run in each working copy before committing
        #[arg(long)]
        convert: Option<String>,

        /// Stop after committing; do not push or open review requests
        #[arg(long)]
        no_pr: bool,

        /// Merge review requests after opening them
        #[arg(long, conflicts_with = "no_pr")]
        merge: bool,

        /// Merge method, overriding the `merge_method` setting
        #[arg(long, value_name = "merge|squash|rebase", requires = "merge")]
        merge_method: Option<MergeMethod>,

        /// Number of modules processed concurrently
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,
    },

    /// Show the resolved configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "modsync=debug" } else { "modsync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            message,
            branch,
            modules,
            convert,
            no_pr,
            merge,
            merge_method,
            jobs,
        } => {
            let options = RunOptions {
                message,
                branch,
                modules,
                convert,
                no_pr,
                merge,
                merge_method,
                jobs,
            };
            cli::run_fleet(cli.config.as_deref(), options).await
        }
        Commands::Config => cli::run_config(cli.config.as_deref()).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if e.is_config_error() {
                eprintln!("configuration error: {e}");
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
