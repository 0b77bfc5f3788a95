//! Adapter error types.
//!
//! All adapters surface errors through [`AdapterError`].  Each variant
//! carries enough context for callers to decide whether a failure is
//! per-item (skip and continue) or total (propagate).

/// Unified error type for FlowDeck adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// An I/O operation failed within the adapter.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be sent or its body could not be read.
    #[error("request `{operation}` failed: {reason}")]
    Request { operation: String, reason: String },

    /// The remote service answered with a non-success status.
    #[error("`{operation}` returned {status}: {message}")]
    Status {
        operation: String,
        status: u16,
        message: String,
    },

    /// The requested resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// An operation exceeded its time limit.
    #[error("timeout after {seconds}s: {reason}")]
    Timeout { seconds: u64, reason: String },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A path or argument was rejected before any I/O happened.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error in adapter setup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    /// `true` for errors that mean the resource is simply absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Self::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, AdapterError>;
