//! Adapters for FlowDeck.
//!
//! The workflow catalog depends on two capabilities, defined in
//! [`traits`]:
//!
//! - [`FileSource`]: enumerate and read workflow definition files.
//! - [`ExecutionControl`]: list the runs of one workflow.
//!
//! Implementations:
//!
//! - [`GitHubSource`]: both capabilities over the GitHub REST API.
//! - [`LocalWorkflowSource`]: [`FileSource`] over a local checkout.

pub mod error;
pub mod filesystem;
pub mod github;
pub mod traits;

pub use error::{AdapterError, Result};
pub use filesystem::LocalWorkflowSource;
pub use github::{GitHubConfig, GitHubSource};
pub use traits::{
    DEFINITION_EXTENSIONS, DefinitionFile, ExecutionControl, FileSource, RepositoryKey,
    default_extensions, has_definition_extension,
};
