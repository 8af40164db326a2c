//! Error types for the search worker and catalog loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors talking to the search worker.
///
/// Any of these means search is unavailable for the rest of the session.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// There is no tokio runtime to host the worker task.
    #[error("cannot start search worker: {0}")]
    Runtime(String),

    /// The worker task has stopped and can no longer exchange messages.
    #[error("search worker disconnected")]
    Disconnected,

    /// The worker task panicked or was aborted.
    #[error("search worker failed: {0}")]
    Failed(String),
}

/// Convenience alias for worker results.
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;

/// Errors obtaining the raw catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog server answered with a non-success status.
    #[error("HTTP error! status: {status} ({url})")]
    Status { status: u16, url: String },

    /// An error propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog document is not a JSON array.
    #[error("invalid catalog: {0}")]
    Parse(#[from] songdex_core::Error),
}

impl CatalogError {
    /// Returns `true` when the fetch may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Io { .. } | Self::Parse(_) => false,
        }
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
