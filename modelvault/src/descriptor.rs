//! File descriptors and the derived pipeline locations.
//!
//! A [`FileDescriptor`] is the fully-resolved description of one file to
//! acquire, handed over by the metadata collaborator. The pipeline never
//! invents paths of its own: everything it touches on disk is derived
//! deterministically from `(target_directory, file_name)` via
//! [`PipelineLocations`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Role of a file within a model entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileRole {
    /// A model weights file; carries a checksum and is compressed.
    Model,
    /// A preview image or other auxiliary file.
    Asset,
}

/// Caller-supplied description of one file to acquire.
///
/// Immutable once built. Descriptors are created fresh per invocation from
/// catalog data; nothing about them is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Download URL for the file.
    pub source_url: String,
    /// Absolute directory the file is archived into.
    pub target_directory: PathBuf,
    /// Final file name within the target directory.
    pub file_name: String,
    /// Expected SHA-256 digest (hex, any case), when the catalog supplies one.
    #[serde(default)]
    pub expected_hash: Option<String>,
    /// Expected size in bytes, advisory only.
    #[serde(default)]
    pub expected_size_bytes: Option<u64>,
    /// Whether this is a model file or an auxiliary asset.
    pub role: FileRole,
}

impl FileDescriptor {
    /// Derive the four pipeline locations for this descriptor.
    pub fn locations(&self) -> PipelineLocations {
        PipelineLocations::new(&self.target_directory, &self.file_name)
    }
}

/// A sidecar text file written next to the artifacts (catalog metadata,
/// description, trained words). Built by the collaborator; the pipeline
/// only writes it if it does not already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarFile {
    /// Absolute path of the sidecar file.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
}

/// The four path names that encode acquisition progress for one file.
///
/// At most one of them is authoritative at any planning decision; transient
/// overlap of `final` and `archived` signals an interrupted previous run and
/// is resolved by the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLocations {
    /// Partial download bytes: `<name>.tmp`.
    pub staging: PathBuf,
    /// Fully downloaded, not yet checksum-confirmed: `<name>.verify`.
    pub pending_verify: PathBuf,
    /// Checksum-confirmed artifact: `<name>`.
    pub final_path: PathBuf,
    /// Compressed artifact: `<name>.7z`.
    pub archived: PathBuf,
}

impl PipelineLocations {
    /// Derive the location set from a target directory and file name.
    pub fn new(target_directory: &Path, file_name: &str) -> Self {
        Self {
            staging: target_directory.join(format!("{file_name}.tmp")),
            pending_verify: target_directory.join(format!("{file_name}.verify")),
            final_path: target_directory.join(file_name),
            archived: target_directory.join(format!("{file_name}.7z")),
        }
    }

    /// Snapshot which of the four locations currently exist on disk.
    pub fn probe(&self) -> PathsPresent {
        PathsPresent {
            staging: self.staging.exists(),
            pending_verify: self.pending_verify.exists(),
            final_path: self.final_path.exists(),
            archived: self.archived.exists(),
        }
    }
}

/// Existence snapshot of the four pipeline locations.
///
/// Decouples the planning decision from filesystem I/O so the decision table
/// can be unit-tested as a pure function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathsPresent {
    pub staging: bool,
    pub pending_verify: bool,
    pub final_path: bool,
    pub archived: bool,
}
