//! The `fetch` command: plan and execute a manifest.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use modelvault::planner::TaskPlanner;
use modelvault::scheduler::{SchedulerSummary, TaskCompletionCallback, TaskScheduler};
use modelvault::PipelineConfig;

use crate::commands::format_task;
use crate::error::CliError;
use crate::manifest::Manifest;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

/// Fetch everything a manifest describes.
///
/// Individual task failures are reported but do not fail the invocation;
/// re-running the same manifest picks up exactly the files that are not yet
/// in their authoritative state.
pub fn run(manifest_path: &Path, config: PipelineConfig) -> Result<(), CliError> {
    let manifest = Manifest::load(manifest_path)?;
    info!(
        manifest = %manifest_path.display(),
        files = manifest.files.len(),
        sidecars = manifest.sidecars.len(),
        "loaded manifest"
    );

    let planner = TaskPlanner::new(&config)?;
    let mut tasks = planner.plan_all(&manifest.files)?;
    tasks.extend(
        manifest
            .sidecars
            .iter()
            .filter_map(|sidecar| planner.plan_sidecar(sidecar)),
    );

    if tasks.is_empty() {
        println!("Nothing to do: all files are already archived.");
        return Ok(());
    }

    println!("Running {} task(s):", tasks.len());
    for task in &tasks {
        println!("  {}", format_task(task).replace('\n', "\n  "));
    }
    println!();

    let progress = ProgressBar::new(tasks.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let bar = progress.clone();
    let on_complete: TaskCompletionCallback = Box::new(move |report| {
        bar.set_message(report.description.clone());
        bar.inc(1);
    });

    let scheduler = TaskScheduler::new(config.max_threads);
    let reports = scheduler.run_with_progress(tasks, Some(on_complete));
    progress.finish_and_clear();

    let summary = SchedulerSummary::from_reports(&reports);
    println!("Done: {} succeeded, {} failed.", summary.succeeded, summary.failed);
    for report in reports.iter().filter(|r| !r.outcome.is_success()) {
        println!(
            "  FAILED {}: {}",
            report.description,
            report.outcome.failure_reason().unwrap_or("unknown")
        );
    }

    Ok(())
}
