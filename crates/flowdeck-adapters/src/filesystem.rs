//! Local checkout file source.
//!
//! Reads workflow definitions from a repository checked out on disk using
//! `tokio::fs`.  Every [`RepositoryKey`] resolves against the same root
//! directory, and paths are validated so they cannot escape it.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AdapterError, Result};
use crate::traits::{
    DefinitionFile, FileSource, RepositoryKey, default_extensions, has_definition_extension,
};

/// File source backed by a local directory.
pub struct LocalWorkflowSource {
    /// Root of the checked-out repository.
    root_dir: PathBuf,
    /// Extensions treated as definition files.
    extensions: Vec<String>,
}

impl LocalWorkflowSource {
    /// Create a source rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            extensions: default_extensions(),
        }
    }

    /// Override the extensions treated as definition files.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Resolve a repository-relative path, rejecting anything that would
    /// leave the root.
    fn resolve(&self, raw_path: &str) -> Result<PathBuf> {
        let relative = Path::new(raw_path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(AdapterError::InvalidInput(format!(
                "path `{raw_path}` escapes the repository root"
            )));
        }
        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl FileSource for LocalWorkflowSource {
    async fn list_definition_files(
        &self,
        repo: &RepositoryKey,
        dir: &str,
    ) -> Result<Vec<DefinitionFile>> {
        let full = self.resolve(dir)?;
        debug!(repo = %repo, path = %full.display(), "listing local workflow directory");

        let mut entries = match tokio::fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = dir.trim_matches('/');
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !has_definition_extension(&name, &self.extensions) {
                continue;
            }
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            files.push(DefinitionFile { name, path });
        }

        // read_dir order is platform-dependent.
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn read_file_content(&self, _repo: &RepositoryKey, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::read_to_string(&full).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RepositoryKey {
        RepositoryKey::new("local", "checkout")
    }

    #[test]
    fn resolve_rejects_parent_components() {
        let source = LocalWorkflowSource::new("/repo");
        assert!(source.resolve("../etc/passwd").is_err());
        assert!(source.resolve(".github/../../x").is_err());
        assert_eq!(
            source.resolve("/.github/workflows").unwrap(),
            PathBuf::from("/repo/.github/workflows")
        );
    }

    #[tokio::test]
    async fn lists_only_definition_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let workflows = dir.path().join(".github/workflows");
        std::fs::create_dir_all(workflows.join("nested")).unwrap();
        std::fs::write(workflows.join("release.yaml"), "on: push").unwrap();
        std::fs::write(workflows.join("ci.yml"), "on: push").unwrap();
        std::fs::write(workflows.join("notes.txt"), "x").unwrap();

        let source = LocalWorkflowSource::new(dir.path());
        let files = source
            .list_definition_files(&key(), ".github/workflows")
            .await
            .unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ci.yml", "release.yaml"]);
        assert_eq!(files[0].path, ".github/workflows/ci.yml");
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalWorkflowSource::new(dir.path());
        let files = source
            .list_definition_files(&key(), ".github/workflows")
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalWorkflowSource::new(dir.path());
        let err = source.read_file_content(&key(), "nope.yml").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
