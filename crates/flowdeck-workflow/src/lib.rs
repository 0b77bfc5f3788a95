//! Workflow definition parsing for FlowDeck.
//!
//! This crate turns the raw text of a workflow definition file into a
//! normalized [`WorkflowDefinition`]:
//!
//! - **Metadata comment parser**: extracts the human-written
//!   `PURPOSE` / `TRIGGER` / `SCOPE` / `ACTIONS` / `INPUTS` block from
//!   bracketed YAML comments via [`parse_metadata`].
//! - **Trigger/input extractor**: reads the `on:` node into a
//!   [`TriggerSet`] and the manual-dispatch inputs into [`InputSpec`]s via
//!   [`extract`].
//! - **Definition builder**: composes both into one definition per file
//!   via [`build_definition`], which never fails.
//!
//! Parsing is synchronous and pure; fetching files and caching the result
//! live in `flowdeck-store`.
//!
//! # Example
//!
//! ```rust
//! use flowdeck_workflow::build_definition;
//!
//! let raw = "name: CI\non: [push, pull_request]\njobs:\n  test: {}\n";
//! let def = build_definition("ci.yml", ".github/workflows/ci.yml", raw);
//! assert!(def.enabled);
//! assert!(def.triggers.push);
//! ```

pub mod builder;
pub mod error;
pub mod metadata;
pub mod problem;
pub mod triggers;
pub mod types;

pub use builder::{build_definition, placeholder, try_build, validate};
pub use error::{Result, WorkflowError};
pub use metadata::{MetadataParser, parse_metadata};
pub use problem::{Problem, ProblemKind, settle};
pub use triggers::{Extracted, TriggerSource, extract};
pub use types::{
    InputSpec, InputType, MetadataBlock, RunStatus, RunSummary, TriggerSet, WorkflowDefinition,
    filename_stem,
};
