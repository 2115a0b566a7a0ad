//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The manifest file could not be read or parsed.
    #[error("failed to load manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// The pipeline rejected the configuration or failed while planning.
    #[error(transparent)]
    Pipeline(#[from] modelvault::PipelineError),
}
