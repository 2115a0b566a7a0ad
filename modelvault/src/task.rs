//! The task abstraction the pipeline composes over.
//!
//! A task is a run-to-completion unit of work with a human-readable
//! description and a boolean-or-error outcome. The variants cover the
//! pipeline stages plus `Chain`, which runs its children in order and
//! short-circuits on the first failure without rolling back completed
//! children. Retries happen inside a task (the download loop), never by
//! re-submission.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, error};

use crate::checksum::VerifyTask;
use crate::compress::CompressTask;
use crate::error::{PipelineError, PipelineResult};
use crate::transfer::DownloadTask;

/// Outcome of running a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task completed successfully.
    Success,
    /// The task failed with a human-readable reason.
    Failure(String),
}

impl TaskOutcome {
    /// Returns true if the task succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

/// Per-task result handed back to the caller after execution.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Description of the task that ran.
    pub description: String,
    /// Whether it succeeded, and why not if it failed.
    pub outcome: TaskOutcome,
}

/// Write a sidecar text file (catalog metadata, description, trained
/// words), creating parent directories as needed.
#[derive(Debug, Clone)]
pub struct WriteTextTask {
    pub path: PathBuf,
    pub content: String,
}

impl WriteTextTask {
    pub fn new(path: PathBuf, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }

    pub fn description(&self) -> String {
        format!("Write \"{}\"", self.path.display())
    }

    pub fn run(&self) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.path, &self.content).map_err(|e| PipelineError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Ordered sequence of tasks for one artifact.
#[derive(Debug, Clone)]
pub struct ChainTask {
    /// Short name for summaries, e.g. "Download, verify and compress".
    pub name: String,
    pub tasks: Vec<Task>,
}

impl ChainTask {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }
}

/// A uniform polymorphic unit of work.
#[derive(Debug, Clone)]
pub enum Task {
    Download(DownloadTask),
    Verify(VerifyTask),
    Compress(CompressTask),
    WriteText(WriteTextTask),
    Chain(ChainTask),
}

impl Task {
    /// Human-readable description for summaries and reports.
    pub fn description(&self) -> String {
        match self {
            Self::Download(task) => task.description(),
            Self::Verify(task) => task.description(),
            Self::Compress(task) => task.description(),
            Self::WriteText(task) => task.description(),
            Self::Chain(chain) => chain.name.clone(),
        }
    }

    /// Run the task to completion.
    ///
    /// A chain stops at the first failing child and propagates that child's
    /// failure; completed children are not rolled back.
    pub fn run(&self) -> TaskOutcome {
        match self {
            Self::Download(task) => outcome_of(task.description(), task.run()),
            Self::Verify(task) => outcome_of(task.description(), task.run()),
            Self::Compress(task) => outcome_of(task.description(), task.run()),
            Self::WriteText(task) => outcome_of(task.description(), task.run()),
            Self::Chain(chain) => {
                for task in &chain.tasks {
                    let outcome = task.run();
                    if let TaskOutcome::Failure(reason) = outcome {
                        error!(
                            task = %task.description(),
                            reason,
                            "task failed, exiting chain"
                        );
                        return TaskOutcome::Failure(reason);
                    }
                }
                TaskOutcome::Success
            }
        }
    }
}

fn outcome_of(description: String, result: PipelineResult<()>) -> TaskOutcome {
    match result {
        Ok(()) => {
            debug!(task = %description, "task completed");
            TaskOutcome::Success
        }
        Err(e) => TaskOutcome::Failure(e.to_string()),
    }
}
