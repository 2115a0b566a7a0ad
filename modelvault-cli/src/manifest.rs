//! Manifest loading.
//!
//! A manifest is a JSON file listing the files to acquire and any sidecar
//! text files to write next to them. It is produced by whatever resolves
//! catalog metadata; the CLI only consumes it.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use modelvault::descriptor::{FileDescriptor, SidecarFile};

use crate::error::CliError;

/// Everything one invocation should acquire.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Files to download, verify and archive.
    pub files: Vec<FileDescriptor>,
    /// Sidecar text files, written only if absent.
    #[serde(default)]
    pub sidecars: Vec<SidecarFile>,
}

impl Manifest {
    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path).map_err(|e| CliError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CliError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
