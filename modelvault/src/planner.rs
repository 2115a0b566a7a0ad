//! Pipeline planning: deciding what work a file still needs.
//!
//! The four on-disk locations are the only persisted state, so planning is a
//! function of which of them exist. [`plan_state`] is that function, pure so
//! the decision table can be tested without touching a filesystem;
//! [`TaskPlanner`] probes the real paths, resolves interrupted-run overlaps
//! deterministically, and materializes the ordered task chain.

use std::fs;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::checksum::VerifyTask;
use crate::compress::CompressTask;
use crate::config::PipelineConfig;
use crate::descriptor::{FileDescriptor, FileRole, PathsPresent, SidecarFile};
use crate::error::{PipelineError, PipelineResult};
use crate::task::{ChainTask, Task, WriteTextTask};
use crate::transfer::{DownloadTask, HttpTransfer};

/// The next pipeline step required for a file, derived from path existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Nothing to do; the authoritative artifact already exists.
    Nothing,
    /// Both final and archived exist: an interrupted compress-then-cleanup.
    /// The archive may be truncated and must be deleted, then the state
    /// re-evaluated.
    ResolveInterruptedCompress,
    /// A final artifact exists but no archive: re-verify it, then compress.
    CompressExisting,
    /// A fully downloaded file awaits verification (then compression, when
    /// enabled).
    VerifyPending,
    /// No artifact yet, or only partial staging bytes: download from the
    /// start of the chain.
    Download,
}

/// Pure planning decision over the existence snapshot.
///
/// Evaluated in priority order; see the variants of [`NextAction`] for the
/// meaning of each outcome. With compression disabled a stale archive is
/// never consulted: a present final artifact means done, anything less
/// re-enters the pipeline at the appropriate stage.
pub fn plan_state(present: PathsPresent, compression_enabled: bool) -> NextAction {
    if !compression_enabled {
        if present.final_path {
            return NextAction::Nothing;
        }
        if present.pending_verify {
            return NextAction::VerifyPending;
        }
        return NextAction::Download;
    }

    if present.final_path && present.archived {
        return NextAction::ResolveInterruptedCompress;
    }
    if present.archived {
        return NextAction::Nothing;
    }
    if present.final_path {
        return NextAction::CompressExisting;
    }
    if present.pending_verify {
        return NextAction::VerifyPending;
    }
    NextAction::Download
}

/// Materializes task plans for file descriptors.
pub struct TaskPlanner {
    transfer: Arc<HttpTransfer>,
    compression_enabled: bool,
}

impl TaskPlanner {
    /// Build a planner (and its shared transfer engine) from the pipeline
    /// configuration.
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        Ok(Self {
            transfer: Arc::new(HttpTransfer::new(config)?),
            compression_enabled: config.compression_enabled,
        })
    }

    /// Plan the work required for one descriptor.
    ///
    /// Returns `None` when the artifact is already in its authoritative
    /// state. Auxiliary assets are never compressed; model files follow the
    /// configured compression setting.
    pub fn plan(&self, descriptor: &FileDescriptor) -> PipelineResult<Option<Task>> {
        let locations = descriptor.locations();
        let compress = self.compression_enabled && descriptor.role == FileRole::Model;

        let action = loop {
            let present = locations.probe();
            match plan_state(present, compress) {
                NextAction::ResolveInterruptedCompress => {
                    warn!(
                        archive = %locations.archived.display(),
                        "final and archived both present, deleting possibly truncated archive"
                    );
                    fs::remove_file(&locations.archived).map_err(|e| {
                        PipelineError::WriteFailed {
                            path: locations.archived.clone(),
                            source: e,
                        }
                    })?;
                }
                action => break action,
            }
        };

        debug!(
            file = %locations.final_path.display(),
            ?action,
            "planned next action"
        );

        let verify = || {
            Task::Verify(VerifyTask::new(
                locations.pending_verify.clone(),
                locations.final_path.clone(),
                descriptor.expected_hash.clone(),
            ))
        };
        let compress_task = || {
            Task::Compress(CompressTask::new(
                locations.final_path.clone(),
                locations.archived.clone(),
            ))
        };

        let task = match action {
            NextAction::Nothing => None,
            NextAction::CompressExisting => Some(Task::Chain(ChainTask::new(
                "Verify and compress",
                vec![
                    Task::Verify(VerifyTask::new(
                        locations.final_path.clone(),
                        locations.final_path.clone(),
                        descriptor.expected_hash.clone(),
                    )),
                    compress_task(),
                ],
            ))),
            NextAction::VerifyPending => {
                if compress {
                    Some(Task::Chain(ChainTask::new(
                        "Verify and compress",
                        vec![verify(), compress_task()],
                    )))
                } else {
                    Some(verify())
                }
            }
            NextAction::Download => {
                let download = Task::Download(DownloadTask::new(
                    Arc::clone(&self.transfer),
                    descriptor.source_url.clone(),
                    locations.staging.clone(),
                    locations.pending_verify.clone(),
                ));
                let mut tasks = vec![download, verify()];
                let name = if compress {
                    tasks.push(compress_task());
                    "Download, verify and compress"
                } else {
                    "Download and verify"
                };
                Some(Task::Chain(ChainTask::new(name, tasks)))
            }
            NextAction::ResolveInterruptedCompress => unreachable!("resolved above"),
        };

        Ok(task)
    }

    /// Plan all descriptors, dropping the ones with nothing to do.
    pub fn plan_all(&self, descriptors: &[FileDescriptor]) -> PipelineResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for descriptor in descriptors {
            if let Some(task) = self.plan(descriptor)? {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Plan a sidecar write, skipped when the file already exists.
    pub fn plan_sidecar(&self, sidecar: &SidecarFile) -> Option<Task> {
        if sidecar.path.exists() {
            return None;
        }
        Some(Task::WriteText(WriteTextTask::new(
            sidecar.path.clone(),
            sidecar.content.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn present(
        staging: bool,
        pending_verify: bool,
        final_path: bool,
        archived: bool,
    ) -> PathsPresent {
        PathsPresent {
            staging,
            pending_verify,
            final_path,
            archived,
        }
    }

    #[test]
    fn test_plan_state_archived_is_done_with_compression() {
        assert_eq!(
            plan_state(present(false, false, false, true), true),
            NextAction::Nothing
        );
    }

    #[test]
    fn test_plan_state_final_is_done_without_compression() {
        assert_eq!(
            plan_state(present(false, false, true, false), false),
            NextAction::Nothing
        );
        // A stale archive next to it changes nothing.
        assert_eq!(
            plan_state(present(false, false, true, true), false),
            NextAction::Nothing
        );
    }

    #[test]
    fn test_plan_state_final_needs_compression() {
        assert_eq!(
            plan_state(present(false, false, true, false), true),
            NextAction::CompressExisting
        );
    }

    #[test]
    fn test_plan_state_overlap_resolved_deterministically() {
        assert_eq!(
            plan_state(present(false, false, true, true), true),
            NextAction::ResolveInterruptedCompress
        );
    }

    #[test]
    fn test_plan_state_pending_verify() {
        assert_eq!(
            plan_state(present(false, true, false, false), true),
            NextAction::VerifyPending
        );
        assert_eq!(
            plan_state(present(false, true, false, false), false),
            NextAction::VerifyPending
        );
    }

    #[test]
    fn test_plan_state_nothing_on_disk_downloads() {
        assert_eq!(
            plan_state(present(false, false, false, false), true),
            NextAction::Download
        );
    }

    #[test]
    fn test_plan_state_staging_only_downloads() {
        // Partial staging bytes re-enter at the download stage, where the
        // transfer resumes from the current size.
        assert_eq!(
            plan_state(present(true, false, false, false), true),
            NextAction::Download
        );
        assert_eq!(
            plan_state(present(true, false, false, false), false),
            NextAction::Download
        );
    }

    fn planner(compression: bool) -> TaskPlanner {
        TaskPlanner::new(
            &PipelineConfig::default()
                .with_compression(compression)
                .with_retry_delay(Duration::ZERO),
        )
        .unwrap()
    }

    fn descriptor(dir: &std::path::Path) -> FileDescriptor {
        FileDescriptor {
            source_url: "https://example.com/a.bin".to_string(),
            target_directory: dir.to_path_buf(),
            file_name: "a.bin".to_string(),
            expected_hash: Some("abcd".to_string()),
            expected_size_bytes: Some(1024),
            role: FileRole::Model,
        }
    }

    #[test]
    fn test_plan_fresh_file_is_three_stage_chain() {
        let temp = TempDir::new().unwrap();
        let task = planner(true).plan(&descriptor(temp.path())).unwrap();

        match task {
            Some(Task::Chain(chain)) => {
                assert_eq!(chain.name, "Download, verify and compress");
                assert_eq!(chain.tasks.len(), 3);
                assert!(matches!(chain.tasks[0], Task::Download(_)));
                assert!(matches!(chain.tasks[1], Task::Verify(_)));
                assert!(matches!(chain.tasks[2], Task::Compress(_)));
            }
            other => panic!("expected three-stage chain, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_fresh_file_without_compression_is_two_stage_chain() {
        let temp = TempDir::new().unwrap();
        let task = planner(false).plan(&descriptor(temp.path())).unwrap();

        match task {
            Some(Task::Chain(chain)) => {
                assert_eq!(chain.tasks.len(), 2);
                assert!(matches!(chain.tasks[0], Task::Download(_)));
                assert!(matches!(chain.tasks[1], Task::Verify(_)));
            }
            other => panic!("expected two-stage chain, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_archived_file_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin.7z"), b"archive").unwrap();

        let task = planner(true).plan(&descriptor(temp.path())).unwrap();
        assert!(task.is_none());
    }

    #[test]
    fn test_plan_final_file_is_empty_without_compression() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin"), b"artifact").unwrap();

        let task = planner(false).plan(&descriptor(temp.path())).unwrap();
        assert!(task.is_none());
    }

    #[test]
    fn test_plan_final_file_reverifies_before_compressing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin"), b"artifact").unwrap();

        let task = planner(true).plan(&descriptor(temp.path())).unwrap();
        match task {
            Some(Task::Chain(chain)) => {
                assert_eq!(chain.name, "Verify and compress");
                assert!(matches!(&chain.tasks[0], Task::Verify(v)
                    if v.input == v.output));
                assert!(matches!(chain.tasks[1], Task::Compress(_)));
            }
            other => panic!("expected verify-and-compress chain, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_resolves_final_and_archived_overlap() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin"), b"artifact").unwrap();
        fs::write(temp.path().join("a.bin.7z"), b"truncated archive").unwrap();

        let task = planner(true).plan(&descriptor(temp.path())).unwrap();

        // The stale archive is removed and the plan re-enters at
        // verify-and-compress.
        assert!(!temp.path().join("a.bin.7z").exists());
        match task {
            Some(Task::Chain(chain)) => assert_eq!(chain.name, "Verify and compress"),
            other => panic!("expected verify-and-compress chain, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_pending_verify_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin.verify"), b"downloaded").unwrap();

        match planner(false).plan(&descriptor(temp.path())).unwrap() {
            Some(Task::Verify(_)) => {}
            other => panic!("expected bare verify task, got {other:?}"),
        }

        match planner(true).plan(&descriptor(temp.path())).unwrap() {
            Some(Task::Chain(chain)) => {
                assert_eq!(chain.name, "Verify and compress");
                assert!(matches!(chain.tasks[0], Task::Verify(_)));
            }
            other => panic!("expected verify-and-compress chain, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_asset_is_never_compressed() {
        let temp = TempDir::new().unwrap();
        let asset = FileDescriptor {
            source_url: "https://example.com/p.png".to_string(),
            target_directory: temp.path().to_path_buf(),
            file_name: "p.png".to_string(),
            expected_hash: None,
            expected_size_bytes: None,
            role: FileRole::Asset,
        };

        match planner(true).plan(&asset).unwrap() {
            Some(Task::Chain(chain)) => {
                assert_eq!(chain.name, "Download and verify");
                assert_eq!(chain.tasks.len(), 2);
            }
            other => panic!("expected download-and-verify chain, got {other:?}"),
        }

        // Once the asset is present, nothing remains to do even though the
        // global compression switch is on.
        fs::write(temp.path().join("p.png"), b"image").unwrap();
        assert!(planner(true).plan(&asset).unwrap().is_none());
    }

    #[test]
    fn test_plan_all_skips_completed_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.bin.7z"), b"archive").unwrap();

        let mut second = descriptor(temp.path());
        second.file_name = "b.bin".to_string();

        let tasks = planner(true)
            .plan_all(&[descriptor(temp.path()), second])
            .unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_plan_sidecar_skips_existing() {
        let temp = TempDir::new().unwrap();
        let sidecar = SidecarFile {
            path: temp.path().join("description.html"),
            content: "<p>hello</p>".to_string(),
        };

        let planner = planner(true);
        assert!(planner.plan_sidecar(&sidecar).is_some());

        fs::write(&sidecar.path, "<p>hello</p>").unwrap();
        assert!(planner.plan_sidecar(&sidecar).is_none());
    }

    #[test]
    fn test_plan_twice_after_completion_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let d = FileDescriptor {
            expected_hash: None,
            ..descriptor(temp.path())
        };

        // Simulate a completed pipeline run with compression disabled.
        fs::write(temp.path().join("a.bin"), b"artifact").unwrap();
        let planner = planner(false);
        assert!(planner.plan(&d).unwrap().is_none());
        assert!(planner.plan(&d).unwrap().is_none());
    }
}
