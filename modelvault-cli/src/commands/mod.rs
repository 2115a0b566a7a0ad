//! CLI command implementations.

pub mod fetch;
pub mod plan;

use modelvault::Task;

/// Format a planned task for the console, with chain children indented.
pub fn format_task(task: &Task) -> String {
    match task {
        Task::Chain(chain) => {
            let mut lines = vec![chain.name.clone()];
            for child in &chain.tasks {
                lines.push(format!("    {}", child.description()));
            }
            lines.join("\n")
        }
        other => other.description(),
    }
}
