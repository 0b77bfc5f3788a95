//! # flowdeck-store
//!
//! The workflow catalog: a TTL-cached definition list per repository plus a
//! concurrent latest-run fan-out.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  WorkflowCatalog                             │
//! │    definitions / scan_report / invalidate    │
//! │    latest_runs / definitions_with_runs       │
//! ├──────────────────────────────────────────────┤
//! │  TtlCache<RepositoryKey, Arc<ScanReport>>    │
//! │    (DashMap + explicit expiry instants)      │
//! ├──────────────────────────────────────────────┤
//! │  FileSource          ExecutionControl        │
//! │  (flowdeck-adapters)                         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use flowdeck_adapters::{GitHubSource, RepositoryKey};
//! use flowdeck_store::{CatalogConfig, WorkflowCatalog};
//!
//! let github = Arc::new(GitHubSource::new().with_token(&token));
//! let catalog = WorkflowCatalog::new(github.clone(), github, CatalogConfig::default())?;
//! let repo = RepositoryKey::new("octo", "widgets");
//! let definitions = catalog.definitions(&repo).await?;
//! let runs = catalog.latest_runs(&repo, definitions.iter().map(|d| d.filename.clone())).await;
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;

// ── re-exports ───────────────────────────────────────────────────────

pub use cache::{CacheStats, TtlCache};
pub use catalog::{RunReport, ScanReport, WorkflowCatalog};
pub use config::CatalogConfig;
pub use error::{StoreError, StoreResult};
