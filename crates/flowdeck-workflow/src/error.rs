//! Error types for the workflow parsing crate.
//!
//! Parsing never fails a whole batch: these errors are raised at the
//! smallest scope and turned into [`Problem`](crate::Problem) values or
//! default extraction results by the callers.

/// Errors raised while interpreting a workflow definition file.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The raw text is not a valid YAML document.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but lacks the minimum required shape.
    #[error("invalid workflow structure: {reason}")]
    InvalidStructure { reason: String },

    /// A node had a shape the extractor does not know how to read.
    #[error("unsupported shape for `{field}`: expected {expected}")]
    UnsupportedShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, WorkflowError>;
