//! Catalog configuration.
//!
//! [`CatalogConfig`] controls where definitions are discovered and how long
//! a scanned list stays fresh.  Sensible defaults are provided via the
//! [`Default`] implementation, and a builder-style API allows callers to
//! customise individual fields fluently.  The struct deserializes from the
//! `[catalog]` table of the CLI's TOML file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Settings for a [`WorkflowCatalog`](crate::WorkflowCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding workflow definition files.
    ///
    /// Default: **`.github/workflows`**.
    pub workflows_dir: String,

    /// How long a scanned definition list stays fresh, in milliseconds.
    ///
    /// Default: **300 000 ms** (5 minutes).
    pub ttl_ms: u64,

    /// Upper bound for reading a single file, in milliseconds.
    ///
    /// Default: **10 000 ms** (10 seconds).
    pub read_timeout_ms: u64,

    /// Runs requested per workflow when looking up the latest one.
    ///
    /// Default: **1**.
    pub run_lookup_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            workflows_dir: ".github/workflows".to_string(),
            ttl_ms: 300_000,
            read_timeout_ms: 10_000,
            run_lookup_limit: 1,
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workflows directory.
    pub fn with_workflows_dir(mut self, dir: impl Into<String>) -> Self {
        self.workflows_dir = dir.into();
        self
    }

    /// Set the definition-list TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Set the per-file read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set how many runs to request per lookup.
    pub fn with_run_lookup_limit(mut self, limit: usize) -> Self {
        self.run_lookup_limit = limit;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Reject settings the catalog cannot work with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.workflows_dir.trim().is_empty() {
            return Err(StoreError::Config("workflows_dir must not be empty".into()));
        }
        if self.read_timeout_ms == 0 {
            return Err(StoreError::Config("read_timeout_ms must be positive".into()));
        }
        if self.run_lookup_limit == 0 {
            return Err(StoreError::Config("run_lookup_limit must be at least 1".into()));
        }
        Ok(())
    }
}
