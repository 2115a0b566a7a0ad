//! SHA-256 verification of downloaded artifacts.
//!
//! Verification promotes a file from its pending-verify location to its
//! final location. A digest mismatch quarantines the file under a
//! timestamped name instead of deleting it, so a later planning pass sees
//! neither a valid artifact nor silently loses the corrupt data.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// Buffer size for reading files during digest calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 digest of a file as lowercase hex.
pub fn calculate_file_checksum(path: &Path) -> PipelineResult<String> {
    let mut file = File::open(path).map_err(|e| PipelineError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| PipelineError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify a file against an expected digest and promote it to its final
/// location.
///
/// With no expected digest the task degrades to a plain move: any file that
/// downloaded completely is accepted.
#[derive(Debug, Clone)]
pub struct VerifyTask {
    /// File to verify, typically the pending-verify location.
    pub input: PathBuf,
    /// Final location the file is promoted to on success.
    pub output: PathBuf,
    /// Expected SHA-256 digest (hex, any case), if the catalog supplied one.
    pub expected_hash: Option<String>,
}

impl VerifyTask {
    pub fn new(input: PathBuf, output: PathBuf, expected_hash: Option<String>) -> Self {
        Self {
            input,
            output,
            expected_hash,
        }
    }

    /// Human-readable description for summaries and reports.
    pub fn description(&self) -> String {
        match &self.expected_hash {
            Some(hash) => format!("Verify \"{}\" against {}", self.input.display(), hash),
            None => format!("Accept \"{}\" (no checksum available)", self.input.display()),
        }
    }

    /// Run the verification.
    ///
    /// On a digest match (case-insensitive) the input is renamed to the
    /// output path; renaming onto itself is a no-op, which covers
    /// re-verifying a file already in its final location. On a mismatch the
    /// input is renamed to `<output>.failed_verify_<timestamp>` and a
    /// [`PipelineError::ChecksumMismatch`] is returned.
    pub fn run(&self) -> PipelineResult<()> {
        let expected = match &self.expected_hash {
            Some(hash) => hash,
            None => {
                debug!(input = %self.input.display(), "no expected hash, accepting file as-is");
                return self.promote();
            }
        };

        let actual = calculate_file_checksum(&self.input)?;

        if actual.eq_ignore_ascii_case(expected) {
            debug!(input = %self.input.display(), "checksum confirmed");
            return self.promote();
        }

        let quarantine = quarantine_path(&self.output);
        warn!(
            input = %self.input.display(),
            quarantine = %quarantine.display(),
            "checksum mismatch, quarantining file"
        );
        fs::rename(&self.input, &quarantine).map_err(|e| PipelineError::RenameFailed {
            from: self.input.clone(),
            to: quarantine.clone(),
            source: e,
        })?;

        Err(PipelineError::ChecksumMismatch {
            filename: self
                .input
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.clone(),
            actual,
        })
    }

    fn promote(&self) -> PipelineResult<()> {
        if self.input == self.output {
            return Ok(());
        }
        fs::rename(&self.input, &self.output).map_err(|e| PipelineError::RenameFailed {
            from: self.input.clone(),
            to: self.output.clone(),
            source: e,
        })
    }
}

/// Quarantine name for a file that failed verification.
///
/// The timestamp suffix keeps repeated failures from colliding. Quarantined
/// files are never removed by the pipeline.
fn quarantine_path(output: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let name = output
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    output.with_file_name(format!("{name}.failed_verify_{timestamp}"))
}
