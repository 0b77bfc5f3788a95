//! Workflow catalog: cached definition lists and latest-run fan-out.
//!
//! The catalog is the surface the UI/API layer talks to:
//!
//! - [`WorkflowCatalog::definitions`] returns the definition list for a
//!   repository, served from a TTL cache and rebuilt from the file source
//!   on a miss.
//! - [`WorkflowCatalog::latest_runs`] looks up the most recent run of each
//!   requested workflow concurrently.  Run lookups are always live.
//! - [`WorkflowCatalog::invalidate`] drops a repository's cached list.
//!
//! Individual files and lookups fail in isolation: they are recorded as
//! [`Problem`]s and replaced by placeholders.  Only an unreachable file
//! source fails a call, and such a failure leaves the cache untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowdeck_adapters::{DefinitionFile, ExecutionControl, FileSource, RepositoryKey};
use flowdeck_workflow::{
    Problem, ProblemKind, RunSummary, WorkflowDefinition, placeholder, settle, try_build,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{CacheStats, TtlCache};
use crate::config::CatalogConfig;
use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// The outcome of scanning one repository's workflow directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub repository: RepositoryKey,

    /// One definition per enumerated file, in enumeration order.  Files
    /// that failed appear as disabled placeholders.
    pub definitions: Vec<WorkflowDefinition>,

    /// Per-file failures encountered while building `definitions`.
    pub problems: Vec<Problem>,

    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    /// Number of usable definitions.
    pub fn enabled_count(&self) -> usize {
        self.definitions.iter().filter(|d| d.enabled).count()
    }
}

/// The outcome of one latest-run fan-out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Every requested name, mapped to its latest run if one was found.
    pub runs: BTreeMap<String, Option<RunSummary>>,

    /// Per-name lookup failures.
    pub problems: Vec<Problem>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Cached access to workflow definitions and their latest runs.
pub struct WorkflowCatalog {
    files: Arc<dyn FileSource>,
    executions: Arc<dyn ExecutionControl>,
    config: CatalogConfig,
    cache: TtlCache<RepositoryKey, Arc<ScanReport>>,
}

impl WorkflowCatalog {
    /// Create a catalog over the given capabilities.
    pub fn new(
        files: Arc<dyn FileSource>,
        executions: Arc<dyn ExecutionControl>,
        config: CatalogConfig,
    ) -> StoreResult<Self> {
        config.validate()?;
        let cache = TtlCache::new("workflow_definitions", config.ttl());
        Ok(Self {
            files,
            executions,
            config,
            cache,
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Definitions
    // -----------------------------------------------------------------------

    /// The definition list for a repository.
    pub async fn definitions(&self, repo: &RepositoryKey) -> StoreResult<Vec<WorkflowDefinition>> {
        Ok(self.scan_report(repo).await?.definitions.clone())
    }

    /// The cached scan report for a repository, scanning on a miss.
    pub async fn scan_report(&self, repo: &RepositoryKey) -> StoreResult<Arc<ScanReport>> {
        self.cache
            .get_or_try_insert_with(repo.clone(), || async {
                self.scan(repo).await.map(Arc::new)
            })
            .await
    }

    /// Scan the workflow directory without consulting the cache.
    pub async fn scan(&self, repo: &RepositoryKey) -> StoreResult<ScanReport> {
        let files = self
            .files
            .list_definition_files(repo, &self.config.workflows_dir)
            .await
            .map_err(|source| StoreError::Source {
                repository: repo.to_string(),
                source,
            })?;
        debug!(repo = %repo, files = files.len(), "enumerated workflow files");

        let contents = join_all(files.iter().map(|file| self.read_file(repo, file))).await;

        let mut problems = Vec::new();
        let definitions: Vec<WorkflowDefinition> = files
            .iter()
            .zip(contents)
            .map(|(file, content)| {
                let (raw, outcome) = match content {
                    Ok(raw) => {
                        let outcome = try_build(&file.name, &file.path, &raw);
                        (raw, outcome)
                    }
                    Err(problem) => (String::new(), Err(problem)),
                };
                settle(outcome, &mut problems, |problem| {
                    placeholder(&file.name, &file.path, &raw, problem)
                })
            })
            .collect();

        let report = ScanReport {
            repository: repo.clone(),
            definitions,
            problems,
            scanned_at: Utc::now(),
        };
        info!(
            repo = %repo,
            total = report.definitions.len(),
            enabled = report.enabled_count(),
            problems = report.problems.len(),
            "scanned workflow definitions"
        );
        Ok(report)
    }

    /// Read one file, bounded by the configured timeout.
    async fn read_file(
        &self,
        repo: &RepositoryKey,
        file: &DefinitionFile,
    ) -> Result<String, Problem> {
        let timeout = self.config.read_timeout();
        let read = self.files.read_file_content(repo, &file.path);
        match tokio::time::timeout(timeout, read).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(Problem::new(&file.name, ProblemKind::Read, e)),
            Err(_) => Err(Problem::new(
                &file.name,
                ProblemKind::Timeout,
                format!("read did not finish within {} ms", timeout.as_millis()),
            )),
        }
    }

    /// Drop the cached list for a repository.  Returns whether one existed.
    pub fn invalidate(&self, repo: &RepositoryKey) -> bool {
        let removed = self.cache.invalidate(repo);
        info!(repo = %repo, removed, "invalidated workflow definitions");
        removed
    }

    /// Drop every cached list.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    // -----------------------------------------------------------------------
    // Runs
    // -----------------------------------------------------------------------

    /// The latest run of each named workflow.  Every requested name is a
    /// key; failed or empty lookups map to `None`.
    pub async fn latest_runs<I, S>(
        &self,
        repo: &RepositoryKey,
        names: I,
    ) -> BTreeMap<String, Option<RunSummary>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.latest_runs_report(repo, names).await.runs
    }

    /// Like [`latest_runs`](Self::latest_runs), also returning the per-name
    /// failures.
    pub async fn latest_runs_report<I, S>(&self, repo: &RepositoryKey, names: I) -> RunReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        let lookups = names.iter().map(|name| async move {
            let outcome = self.latest_run(repo, name).await;
            (name, outcome)
        });
        let results = join_all(lookups).await;

        let mut report = RunReport::default();
        for (name, outcome) in results {
            let run = settle(outcome, &mut report.problems, |_| None);
            report.runs.insert(name.clone(), run);
        }
        debug!(
            repo = %repo,
            requested = report.runs.len(),
            failed = report.problems.len(),
            "fetched latest runs"
        );
        report
    }

    async fn latest_run(
        &self,
        repo: &RepositoryKey,
        name: &str,
    ) -> Result<Option<RunSummary>, Problem> {
        self.executions
            .list_executions(repo, name, self.config.run_lookup_limit)
            .await
            .map(|runs| runs.into_iter().next())
            .map_err(|e| Problem::new(name, ProblemKind::Lookup, e))
    }

    /// The cached definitions, each paired with its live latest run.
    ///
    /// Runs are looked up by file name.  The cached list is not modified;
    /// fresh copies are returned.
    pub async fn definitions_with_runs(
        &self,
        repo: &RepositoryKey,
    ) -> StoreResult<Vec<WorkflowDefinition>> {
        let report = self.scan_report(repo).await?;
        let runs = self
            .latest_runs(repo, report.definitions.iter().map(|d| d.filename.clone()))
            .await;

        Ok(report
            .definitions
            .iter()
            .map(|def| def.with_last_run(runs.get(&def.filename).cloned().flatten()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
