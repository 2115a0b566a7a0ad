//! Bounded-concurrency execution of planned tasks.
//!
//! A fixed-size pool of worker threads drains a queue built once up front;
//! no tasks are generated during execution. Each task's outcome is captured
//! individually, so one failure never cancels or blocks the rest of the
//! batch, and the pool itself never errors because tasks did.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, error, info};

use crate::task::{Task, TaskOutcome, TaskReport};

/// Callback invoked after each task completes, for progress display.
pub type TaskCompletionCallback = Box<dyn Fn(&TaskReport) + Send + Sync>;

/// Aggregate counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl SchedulerSummary {
    /// Tally the reports of a finished batch.
    pub fn from_reports(reports: &[TaskReport]) -> Self {
        let succeeded = reports.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            succeeded,
            failed: reports.len() - succeeded,
        }
    }
}

/// Fixed-size worker pool for task execution.
#[derive(Debug, Clone, Copy)]
pub struct TaskScheduler {
    max_threads: usize,
}

impl TaskScheduler {
    /// Create a scheduler with the given pool size (minimum 1).
    pub fn new(max_threads: usize) -> Self {
        Self {
            max_threads: max_threads.max(1),
        }
    }

    /// Run all tasks to completion and return per-task reports.
    ///
    /// Completion order is best-effort; the report order reflects it.
    pub fn run(&self, tasks: Vec<Task>) -> Vec<TaskReport> {
        self.run_with_progress(tasks, None)
    }

    /// Run all tasks, invoking `on_complete` as each one finishes.
    pub fn run_with_progress(
        &self,
        tasks: Vec<Task>,
        on_complete: Option<TaskCompletionCallback>,
    ) -> Vec<TaskReport> {
        if tasks.is_empty() {
            return Vec::new();
        }

        let workers = self.max_threads.min(tasks.len());
        info!(tasks = tasks.len(), workers, "starting task execution");

        let queue = Arc::new(Mutex::new(VecDeque::from(tasks)));
        let on_complete = on_complete.map(Arc::new);
        let (tx, rx) = mpsc::channel();

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let on_complete = on_complete.clone();
            let tx = tx.clone();

            handles.push(thread::spawn(move || {
                loop {
                    let task = queue.lock().unwrap().pop_front();
                    let Some(task) = task else {
                        break;
                    };

                    let description = task.description();
                    debug!(task = %description, "worker picked up task");

                    // A panic inside one task must not take down the worker
                    // or the batch; it is reported like any other failure.
                    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!(task = %description, "task panicked");
                            TaskOutcome::Failure("task panicked".to_string())
                        }
                    };

                    let report = TaskReport {
                        description,
                        outcome,
                    };

                    if let Some(cb) = &on_complete {
                        cb(&report);
                    }
                    if tx.send(report).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let reports: Vec<TaskReport> = rx.iter().collect();

        for handle in handles {
            handle.join().ok();
        }

        let summary = SchedulerSummary::from_reports(&reports);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "task execution finished"
        );

        reports
    }
}
