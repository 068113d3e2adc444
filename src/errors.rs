//! Typed error hierarchy for Issue Scout.
//!
//! Two top-level enums cover the two subsystems:
//! - `StoreError`: in-memory job and session stores behind the HTTP API
//! - `ScoutError`: the `extract` command (URL parsing, output writing)

use thiserror::Error;

/// Errors from the in-memory job and session stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Scan {id} not found")]
    ScanNotFound { id: String },

    #[error("Implementation {id} not found")]
    ImplementationNotFound { id: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Errors from the issue extraction command.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Not a valid GitHub URL: {url}")]
    InvalidUrl { url: String },

    #[error("Could not parse GitHub URL '{url}'. Format should be: https://github.com/{{owner}}/{{repo}}")]
    IncompleteUrl { url: String },

    #[error("Failed to write output file at {}: {source}", path.display())]
    OutputWriteFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
