//! The `plan` command: show what a fetch would do, without doing it.

use std::path::Path;

use modelvault::planner::TaskPlanner;
use modelvault::PipelineConfig;

use crate::commands::format_task;
use crate::error::CliError;
use crate::manifest::Manifest;

/// Plan all work for a manifest and print the resulting tasks.
pub fn run(manifest_path: &Path, config: PipelineConfig) -> Result<(), CliError> {
    let manifest = Manifest::load(manifest_path)?;
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

    println!("Would run {} task(s):", tasks.len());
    for task in &tasks {
        println!("  {}", format_task(task).replace('\n', "\n  "));
    }

    Ok(())
}
