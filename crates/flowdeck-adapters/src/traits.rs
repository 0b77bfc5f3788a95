//! Capability traits consumed by the workflow catalog.
//!
//! The catalog never talks to a repository host directly.  It is handed a
//! [`FileSource`] for enumerating and reading definition files and an
//! [`ExecutionControl`] for looking up runs; both are implemented by the
//! GitHub adapter, and [`FileSource`] also by the local-directory adapter.

use std::path::Path;

use async_trait::async_trait;
use flowdeck_workflow::RunSummary;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// File extensions treated as workflow definitions by default.
pub const DEFINITION_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Identity of a source repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryKey {
    pub owner: String,
    pub name: String,
}

impl RepositoryKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`.
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl std::fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One enumerated definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    /// File name including extension.
    pub name: String,
    /// Path inside the repository.
    pub path: String,
}

/// Whether a file name carries one of the given extensions.
pub fn has_definition_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

/// The default extension list as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFINITION_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect()
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Enumerates and reads workflow definition files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// List the definition files directly under `dir`, in a stable order.
    ///
    /// An error here means the source is unreachable and fails the whole
    /// scan; a missing directory is an empty list.
    async fn list_definition_files(
        &self,
        repo: &RepositoryKey,
        dir: &str,
    ) -> Result<Vec<DefinitionFile>>;

    /// Read one file's raw text.
    async fn read_file_content(&self, repo: &RepositoryKey, path: &str) -> Result<String>;
}

/// Looks up workflow executions.
#[async_trait]
pub trait ExecutionControl: Send + Sync {
    /// List at most `limit` runs of one workflow, most recent first.
    async fn list_executions(
        &self,
        repo: &RepositoryKey,
        workflow: &str,
        limit: usize,
    ) -> Result<Vec<RunSummary>>;
}
