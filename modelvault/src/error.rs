//! Error types for the archival pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while acquiring and archiving artifacts.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Failed to read a file or directory.
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    #[error("failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to rename a file between pipeline stages.
    #[error("failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Download failed after exhausting the retry budget.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The remote resource is gone or inaccessible (HTTP 401/404).
    ///
    /// Permanent; the download is not retried.
    #[error("resource unavailable at {url}: HTTP {status}")]
    ResourceUnavailable { url: String, status: u16 },

    /// Request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Checksum verification failed; the file was quarantined.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Archive creation failed.
    #[error("failed to compress {path}: {reason}")]
    CompressionFailed { path: PathBuf, reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to construct the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuildFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_unavailable_display() {
        let err = PipelineError::ResourceUnavailable {
            url: "https://example.com/a.bin".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "resource unavailable at https://example.com/a.bin: HTTP 404"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = PipelineError::ChecksumMismatch {
            filename: "a.bin".to_string(),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("def456"));
    }

    #[test]
    fn test_io_error_source_preserved() {
        let err = PipelineError::ReadFailed {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
