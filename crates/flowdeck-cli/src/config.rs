//! Configuration loading for the `flowdeck` binary.
//!
//! Reads `config/flowdeck.toml` (or the `--config` path) with three
//! optional tables:
//!
//! ```toml
//! [catalog]
//! workflows_dir = ".github/workflows"
//! ttl_ms = 300000
//!
//! [github]
//! base_url = "https://api.github.com"
//!
//! [sources]
//! extensions = ["yml", "yaml"]
//! ```
//!
//! A missing default file yields defaults; an explicitly named file that
//! does not exist is an error.  `GITHUB_TOKEN` overrides any token in the
//! file.

use std::path::Path;

use anyhow::{Context, Result};
use flowdeck_adapters::{GitHubConfig, default_extensions};
use flowdeck_store::CatalogConfig;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cli::SourceArgs;

/// Environment variable holding the GitHub token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub catalog: CatalogConfig,
    pub github: GitHubConfig,
    pub sources: SourcesConfig,
}

/// Settings shared by every file source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Extensions treated as workflow definition files.
    pub extensions: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl FileConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration file")
    }

    /// Load the file at `path`.  `explicit` marks a path the user asked for,
    /// which must exist.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !path.exists() {
            if explicit {
                anyhow::bail!("configuration file {} does not exist", path.display());
            }
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply command-line overrides and the token from the environment.
    pub fn resolve(mut self, args: &SourceArgs, env_token: Option<String>) -> Self {
        if let Some(dir) = &args.workflows_dir {
            self.catalog.workflows_dir = dir.clone();
        }
        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            self.github.token = Some(token);
        }
        self
    }
}
