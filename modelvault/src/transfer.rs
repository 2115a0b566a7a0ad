//! Resumable HTTP transfer of artifacts into the staging area.
//!
//! A download writes into the staging location (`<name>.tmp`) and promotes
//! the file to the pending-verify location (`<name>.verify`) once the body
//! has been streamed completely. Partial staging bytes survive transient
//! failures and process restarts; the next attempt resumes from the current
//! staging size with an HTTP Range request.
//!
//! Failure classification:
//! - 401/404: permanent, the resource is gone or inaccessible; no retry.
//! - 416: the staging bytes no longer match the remote resource; staging is
//!   deleted and the next attempt starts from a full request.
//! - anything else (timeouts, resets, 5xx, stream errors): transient, retried
//!   with a fixed delay up to the configured attempt budget.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::RANGE;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// HTTP transfer engine shared by all download tasks.
///
/// Holds the blocking client, the bearer credential, and the retry budget.
#[derive(Debug)]
pub struct HttpTransfer {
    client: Client,
    token: Option<String>,
    max_retries: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl HttpTransfer {
    /// Build a transfer engine from the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| PipelineError::ClientBuildFailed(e.to_string()))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            timeout: config.timeout,
        })
    }

    /// Download `url` into `staging`, promoting to `destination` on success.
    ///
    /// Runs up to the configured number of attempts. Partial staging bytes
    /// are kept across transient failures so a later attempt (or a later
    /// process run) resumes instead of starting over.
    pub fn download(&self, url: &str, staging: &Path, destination: &Path) -> PipelineResult<()> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            let resume_from = staging_size(staging);

            debug!(
                url,
                attempt,
                max_retries = self.max_retries,
                resume_from,
                "starting download attempt"
            );

            let mut request = self.client.get(url);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if resume_from > 0 {
                request = request.header(RANGE, format!("bytes={resume_from}-"));
            }

            let response = match request.send() {
                Ok(response) => response,
                Err(e) => {
                    if e.is_timeout() {
                        last_error = PipelineError::Timeout {
                            url: url.to_string(),
                            timeout_secs: self.timeout.as_secs(),
                        }
                        .to_string();
                    } else {
                        last_error = e.to_string();
                    }
                    warn!(url, attempt, error = %last_error, "request failed, will retry");
                    self.backoff(attempt);
                    continue;
                }
            };

            let status = response.status();
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                    debug!(url, status = status.as_u16(), "resource gone or inaccessible");
                    return Err(PipelineError::ResourceUnavailable {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                StatusCode::RANGE_NOT_SATISFIABLE => {
                    warn!(
                        url,
                        resume_from, "staging bytes exceed remote resource, restarting from scratch"
                    );
                    fs::remove_file(staging).ok();
                    last_error = format!("HTTP {status} for resume at byte {resume_from}");
                    continue;
                }
                _ if !status.is_success() => {
                    last_error = format!("HTTP {status}");
                    warn!(url, attempt, %status, "unexpected status, will retry");
                    self.backoff(attempt);
                    continue;
                }
                _ => {}
            }

            // A server that ignores the Range header answers 200 with the
            // full body; appending it to the staging bytes would corrupt the
            // file, so the staging content is replaced instead.
            let append = resume_from > 0 && status == StatusCode::PARTIAL_CONTENT;

            match stream_to_staging(response, staging, append) {
                Ok(bytes) => {
                    debug!(url, bytes, "download complete, promoting to pending-verify");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(url, attempt, error = %last_error, "stream interrupted, staging preserved");
                    self.backoff(attempt);
                    continue;
                }
            }

            fs::rename(staging, destination).map_err(|e| PipelineError::RenameFailed {
                from: staging.to_path_buf(),
                to: destination.to_path_buf(),
                source: e,
            })?;

            return Ok(());
        }

        Err(PipelineError::DownloadFailed {
            url: url.to_string(),
            reason: format!(
                "exhausted {} attempts, last error: {}",
                self.max_retries, last_error
            ),
        })
    }

    /// Sleep the fixed retry delay, but not after the final attempt.
    fn backoff(&self, attempt: u32) {
        if attempt < self.max_retries {
            thread::sleep(self.retry_delay);
        }
    }
}

/// Current size of the staging file, zero if absent.
fn staging_size(staging: &Path) -> u64 {
    fs::metadata(staging).map(|m| m.len()).unwrap_or(0)
}

/// Stream the response body into the staging file.
///
/// Returns the number of bytes written by this attempt. On error the staging
/// file is left as-is with whatever bytes arrived.
fn stream_to_staging(
    mut response: reqwest::blocking::Response,
    staging: &Path,
    append: bool,
) -> PipelineResult<u64> {
    if let Some(parent) = staging.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = if append {
        OpenOptions::new().append(true).open(staging)
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(staging)
    }
    .map_err(|e| PipelineError::WriteFailed {
        path: staging.to_path_buf(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = io::copy(&mut response, &mut writer).map_err(|e| PipelineError::WriteFailed {
        path: staging.to_path_buf(),
        source: e,
    })?;

    io::Write::flush(&mut writer).map_err(|e| PipelineError::WriteFailed {
        path: staging.to_path_buf(),
        source: e,
    })?;

    Ok(bytes)
}

/// Download one file into staging and promote it to pending-verify.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    transfer: Arc<HttpTransfer>,
    /// Download URL.
    pub source_url: String,
    /// Staging location (`<name>.tmp`).
    pub staging: PathBuf,
    /// Promotion target (`<name>.verify`, or the final path for assets
    /// without a verification stage).
    pub destination: PathBuf,
}

impl DownloadTask {
    pub fn new(
        transfer: Arc<HttpTransfer>,
        source_url: impl Into<String>,
        staging: PathBuf,
        destination: PathBuf,
    ) -> Self {
        Self {
            transfer,
            source_url: source_url.into(),
            staging,
            destination,
        }
    }

    /// Human-readable description for summaries and reports.
    ///
    /// Mentions resumption when partial staging bytes are already on disk at
    /// description time.
    pub fn description(&self) -> String {
        let verb = if self.staging.exists() {
            "Resume download"
        } else {
            "Download"
        };
        format!(
            "{} \"{}\" to \"{}\"",
            verb,
            self.source_url,
            self.destination.display()
        )
    }

    /// Run the download to completion or exhaustion of the retry budget.
    pub fn run(&self) -> PipelineResult<()> {
        self.transfer
            .download(&self.source_url, &self.staging, &self.destination)
    }
}
