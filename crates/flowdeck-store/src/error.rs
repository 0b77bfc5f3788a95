//! Error types for the flowdeck-store crate.
//!
//! Only call-level failures appear here.  Per-file and per-run failures are
//! contained as [`Problem`](flowdeck_workflow::Problem) values and never
//! surface as a [`StoreError`].

use flowdeck_adapters::AdapterError;
use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that fail a whole catalog call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file source could not be reached at all.
    #[error("file source unavailable for {repository}: {source}")]
    Source {
        repository: String,
        #[source]
        source: AdapterError,
    },

    /// The catalog configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}
