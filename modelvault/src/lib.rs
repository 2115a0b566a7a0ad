//! Modelvault - download, verify and archive model files
//!
//! This library implements a resumable acquisition pipeline for large model
//! artifacts: files are downloaded into staging, promoted through an on-disk
//! verification step, and optionally compressed into single-entry `.7z`
//! archives. The filesystem is the only state store, so an interrupted run
//! is resumed by planning against whatever files are already present.

pub mod checksum;
pub mod compress;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod planner;
pub mod sanitize;
pub mod scheduler;
pub mod task;
pub mod transfer;

pub use config::PipelineConfig;
pub use descriptor::{FileDescriptor, FileRole, SidecarFile};
pub use error::{PipelineError, PipelineResult};
pub use planner::TaskPlanner;
pub use scheduler::{SchedulerSummary, TaskScheduler};
pub use task::{Task, TaskOutcome, TaskReport};
