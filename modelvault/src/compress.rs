//! Compression of verified artifacts into single-entry 7z archives.
//!
//! A successful compression leaves exactly one authoritative file behind:
//! the archive. The uncompressed source is removed only after the archive
//! has been fully written, and a failed write removes the partial archive so
//! the next planning pass retries from the untouched source.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// Compress one verified artifact into a `.7z` archive and remove the
/// source on success.
#[derive(Debug, Clone)]
pub struct CompressTask {
    /// Verified artifact to compress (the final location).
    pub input: PathBuf,
    /// Archive location (`<name>.7z`).
    pub output: PathBuf,
}

impl CompressTask {
    pub fn new(input: PathBuf, output: PathBuf) -> Self {
        Self { input, output }
    }

    /// Human-readable description for summaries and reports.
    pub fn description(&self) -> String {
        format!(
            "Compress \"{}\" to \"{}\"",
            self.input.display(),
            self.output.display()
        )
    }

    /// Run the compression.
    ///
    /// A pre-existing archive alongside the input is assumed to be the
    /// remnant of an interrupted run and is deleted before starting fresh;
    /// a truncated archive must never be trusted or appended to.
    pub fn run(&self) -> PipelineResult<()> {
        if self.input.exists() && self.output.exists() {
            debug!(
                output = %self.output.display(),
                "input and output both exist, removing stale archive from interrupted run"
            );
            fs::remove_file(&self.output).map_err(|e| PipelineError::WriteFailed {
                path: self.output.clone(),
                source: e,
            })?;
        }

        debug!(
            input = %self.input.display(),
            output = %self.output.display(),
            "compressing artifact"
        );

        if let Err(e) = sevenz_rust::compress_to_path(&self.input, &self.output) {
            warn!(
                output = %self.output.display(),
                error = %e,
                "compression failed, removing partial archive"
            );
            fs::remove_file(&self.output).ok();
            return Err(PipelineError::CompressionFailed {
                path: self.input.clone(),
                reason: e.to_string(),
            });
        }

        if self.output.exists() {
            fs::remove_file(&self.input).map_err(|e| PipelineError::WriteFailed {
                path: self.input.clone(),
                source: e,
            })?;
        } else {
            // Tolerated: the archive vanished between write and cleanup,
            // presumably removed externally. The source stays put.
            warn!(
                output = %self.output.display(),
                "archive missing after write, leaving source in place"
            );
        }

        Ok(())
    }
}
