//! CLI entry point for FlowDeck.
//!
//! This binary provides the `flowdeck` command with subcommands for listing
//! a repository's workflow definitions, their latest runs, and the details
//! of a single workflow.

mod cli;
mod config;
mod helpers;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use flowdeck_adapters::{FileSource, GitHubSource, LocalWorkflowSource, RepositoryKey};
use flowdeck_store::WorkflowCatalog;
use serde::Serialize;
use tracing::{debug, info};

use cli::{Cli, Commands, SourceArgs};
use config::{FileConfig, TOKEN_ENV};
use helpers::{
    find_workflow, init_tracing, render_definition, render_list, render_problems, render_runs,
};

const DEFAULT_CONFIG_PATH: &str = "config/flowdeck.toml";

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `.env` may carry RUST_LOG, so it is read before the subscriber exists.
    let env_file = dotenvy::dotenv();
    init_tracing(if cli.verbose { "debug" } else { "info" });
    if let Ok(path) = env_file {
        debug!(path = %path.display(), "loaded environment file");
    }

    let (config_path, explicit) = match &cli.config {
        Some(path) => (path.as_path(), true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    let config = FileConfig::load(config_path, explicit)?
        .resolve(&cli.source, std::env::var(TOKEN_ENV).ok());

    let session = Session::open(&cli.source, config)?;

    match cli.command {
        Commands::List { problems } => cmd_list(&session, problems, cli.json).await,
        Commands::Runs => cmd_runs(&session, cli.json).await,
        Commands::Show { workflow } => cmd_show(&session, &workflow, cli.json).await,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A catalog bound to the repository named on the command line.
struct Session {
    catalog: WorkflowCatalog,
    repo: RepositoryKey,
    /// Whether `repo` names a real GitHub repository run lookups can use.
    remote: bool,
}

impl Session {
    fn open(args: &SourceArgs, config: FileConfig) -> Result<Self> {
        let remote_repo = args
            .repo
            .as_deref()
            .map(|slug| {
                RepositoryKey::parse(slug)
                    .with_context(|| format!("invalid repository `{slug}`, expected owner/name"))
            })
            .transpose()?;

        let github = Arc::new(
            GitHubSource::from_config(&config.github)
                .with_extensions(config.sources.extensions.clone()),
        );

        let selected = (&args.local, remote_repo.clone());
        let (files, repo): (Arc<dyn FileSource>, RepositoryKey) = match selected {
            (Some(dir), repo) => {
                let local = LocalWorkflowSource::new(dir)
                    .with_extensions(config.sources.extensions.clone());
                let repo = repo.unwrap_or_else(|| local_key(dir));
                info!(dir = %dir.display(), repo = %repo, "reading local workflow definitions");
                (Arc::new(local) as Arc<dyn FileSource>, repo)
            }
            (None, Some(repo)) => {
                info!(
                    repo = %repo,
                    base_url = %config.github.base_url,
                    "reading workflow definitions from GitHub"
                );
                (github.clone() as Arc<dyn FileSource>, repo)
            }
            (None, None) => anyhow::bail!("either --repo owner/name or --local DIR is required"),
        };

        let catalog = WorkflowCatalog::new(files, github, config.catalog)
            .context("invalid catalog configuration")?;

        Ok(Self {
            catalog,
            repo,
            remote: remote_repo.is_some(),
        })
    }

    fn require_remote(&self, command: &str) -> Result<()> {
        if !self.remote {
            anyhow::bail!("`{command}` looks up runs on GitHub and needs --repo owner/name");
        }
        Ok(())
    }
}

/// Cache key for a local checkout that has no GitHub counterpart.
fn local_key(dir: &Path) -> RepositoryKey {
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "workspace".to_owned());
    RepositoryKey::new("local", name)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: list
// ---------------------------------------------------------------------------

async fn cmd_list(session: &Session, show_problems: bool, json: bool) -> Result<()> {
    let report = session
        .catalog
        .scan_report(&session.repo)
        .await
        .context("failed to load workflow definitions")?;

    if json {
        return if show_problems {
            print_json(&*report)
        } else {
            print_json(&report.definitions)
        };
    }

    println!();
    println!(
        "  {} -- {} workflows, {} usable",
        session.repo,
        report.definitions.len(),
        report.enabled_count()
    );
    println!();
    print!("{}", render_list(&report.definitions));

    if !report.problems.is_empty() {
        println!();
        if show_problems {
            println!("  Problems:");
            print!("{}", render_problems(&report.problems));
        } else {
            println!(
                "  {} file(s) could not be used; rerun with --problems for details.",
                report.problems.len()
            );
        }
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: runs
// ---------------------------------------------------------------------------

async fn cmd_runs(session: &Session, json: bool) -> Result<()> {
    session.require_remote("runs")?;
    let definitions = session
        .catalog
        .definitions_with_runs(&session.repo)
        .await
        .context("failed to load workflow definitions")?;

    if json {
        return print_json(&definitions);
    }

    println!();
    println!("  Latest runs for {}", session.repo);
    println!();
    print!("{}", render_runs(&definitions));
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: show
// ---------------------------------------------------------------------------

async fn cmd_show(session: &Session, query: &str, json: bool) -> Result<()> {
    let definitions = session
        .catalog
        .definitions(&session.repo)
        .await
        .context("failed to load workflow definitions")?;

    let Some(found) = find_workflow(&definitions, query) else {
        anyhow::bail!("no workflow named `{query}` in {}", session.repo);
    };

    let definition = if session.remote {
        let mut runs = session
            .catalog
            .latest_runs(&session.repo, [found.filename.clone()])
            .await;
        found.with_last_run(runs.remove(&found.filename).flatten())
    } else {
        found.clone()
    };

    if json {
        return print_json(&definition);
    }

    println!();
    print!("{}", render_definition(&definition));
    println!();
    Ok(())
}
