//! CLI argument definitions for FlowDeck.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// FlowDeck -- browse a repository's workflow definitions and their latest runs.
#[derive(Parser)]
#[command(
    name = "flowdeck",
    version,
    about = "FlowDeck -- workflow catalog for GitHub Actions repositories",
    long_about = "Reads the workflow definitions of a repository, extracts their triggers, \
                  manual inputs and metadata comment blocks, and reports the latest run \
                  of each workflow."
)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Path to the TOML configuration file [default: config/flowdeck.toml].
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where workflow definitions are read from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Repository as `owner/name`.
    #[arg(long, short, global = true)]
    pub repo: Option<String>,

    /// Read definitions from a local checkout instead of the GitHub API.
    #[arg(long, global = true, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// Override the workflows directory from the configuration file.
    #[arg(long, global = true)]
    pub workflows_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the workflow definitions of a repository.
    List {
        /// Also print the per-file problems found while scanning.
        #[arg(long)]
        problems: bool,
    },

    /// Show each workflow together with its latest run.
    Runs,

    /// Show the full details of one workflow.
    Show {
        /// File name (`ci.yml`) or display name (`CI`) of the workflow.
        workflow: String,
    },
}
